use super::format_number;
use crate::case::{
    AnalysisRecord, EvidenceItem, RiskAssessment, StrengthAssessment, StrengthItem,
};

const NOT_AVAILABLE: &str = "N/A";
const NONE: &str = "None";

/// Plain-text case summary for export.
///
/// Missing text fields render as "N/A", missing numbers as 0, and empty
/// lists as "None".
pub fn case_summary(
    analysis: Option<&AnalysisRecord>,
    risk: Option<&RiskAssessment>,
    strength: Option<&StrengthAssessment>,
) -> String {
    let default_analysis = AnalysisRecord::default();
    let default_risk = RiskAssessment::default();
    let default_strength = StrengthAssessment::default();
    let analysis = analysis.unwrap_or(&default_analysis);
    let risk = risk.unwrap_or(&default_risk);
    let strength = strength.unwrap_or(&default_strength);

    let parties = analysis.parties.clone().unwrap_or_default();

    let mut out = String::new();
    out.push_str("CASE SUMMARY\n");
    out.push_str("============\n");
    out.push_str(&format!("Case Type: {}\n", text(&analysis.case_type)));
    out.push_str(&format!("Jurisdiction: {}\n", text(&analysis.jurisdiction)));
    out.push_str(&format!("Complexity Score: {}/100\n", number(analysis.complexity_score)));
    out.push_str(&format!("Petitioner: {}\n", text(&parties.petitioner)));
    out.push_str(&format!("Respondent: {}\n", text(&parties.respondent)));
    out.push_str(&format!("Sections: {}\n", joined(&analysis.sections)));
    write_list(&mut out, "Key Facts", analysis.key_facts.iter().map(String::as_str));
    write_list(&mut out, "Legal Issues", analysis.legal_issues.iter().map(String::as_str));

    out.push('\n');
    out.push_str("RISK ASSESSMENT\n");
    out.push_str("===============\n");
    out.push_str(&format!("Overall Risk: {}\n", risk.overall_risk));
    out.push_str(&format!(
        "Legal Penalty Probability: {}%\n",
        number(risk.legal_penalty_probability)
    ));
    out.push_str(&format!("Financial Risk: {}%\n", number(risk.financial_risk)));
    out.push_str(&format!("Urgency Level: {}%\n", number(risk.urgency_level)));
    out.push_str(&format!("Explanation: {}\n", text(&risk.risk_explanation)));

    out.push('\n');
    out.push_str("CASE STRENGTH\n");
    out.push_str("=============\n");
    out.push_str(&format!("Strength Score: {}/100\n", number(strength.strength_score)));
    out.push_str(&format!("Win Probability: {}%\n", number(strength.win_probability)));
    write_list(&mut out, "Strengths", headlines(&strength.strengths));
    write_list(&mut out, "Weaknesses", headlines(&strength.weaknesses));
    write_list(&mut out, "Missing Evidence", headlines(&strength.missing_evidence));
    write_list(&mut out, "Recommendations", headlines(&strength.recommendations));

    out
}

/// One line per evidence item, as the evidence panel shows it.
pub fn evidence_digest(items: &[EvidenceItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item.analysis.as_ok() {
            Some(analysis) => format!(
                "{}: {} impact, type {}, weight {}/100",
                item.filename,
                analysis.impact.as_deref().unwrap_or("Unknown"),
                analysis.document_type.as_deref().unwrap_or(NOT_AVAILABLE),
                number(analysis.weight),
            ),
            None => format!("{}: Unknown impact", item.filename),
        })
        .collect()
}

fn text(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn number(value: Option<f64>) -> String {
    format_number(value.unwrap_or(0.0))
}

fn joined(values: &[String]) -> String {
    if values.is_empty() {
        NONE.to_string()
    } else {
        values.join(", ")
    }
}

fn headlines(items: &[StrengthItem]) -> impl Iterator<Item = &str> {
    items.iter().map(StrengthItem::headline)
}

fn write_list<'a>(out: &mut String, title: &str, items: impl Iterator<Item = &'a str>) {
    out.push_str(&format!("{}:\n", title));
    let mut empty = true;
    for item in items {
        empty = false;
        out.push_str(&format!("  - {}\n", item));
    }
    if empty {
        out.push_str(&format!("  {}\n", NONE));
    }
}
