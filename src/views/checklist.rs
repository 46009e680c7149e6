/// Which checklist applies to a case type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistKind {
    Criminal,
    Civil,
    General,
}

impl ChecklistKind {
    /// Case-insensitive substring match; "criminal" wins over "civil".
    pub fn for_case_type(case_type: &str) -> Self {
        let lower = case_type.to_lowercase();
        if lower.contains("criminal") {
            ChecklistKind::Criminal
        } else if lower.contains("civil") {
            ChecklistKind::Civil
        } else {
            ChecklistKind::General
        }
    }

    pub fn items(&self) -> &'static [&'static str] {
        match self {
            ChecklistKind::Criminal => &CRIMINAL,
            ChecklistKind::Civil => &CIVIL,
            ChecklistKind::General => &GENERAL,
        }
    }
}

const CRIMINAL: [&str; 9] = [
    "Obtain a certified copy of the FIR",
    "Collect the charge sheet and police report",
    "Review the arrest memo and bail status",
    "List prosecution witnesses and their statements",
    "Gather medical or forensic reports",
    "Secure CCTV, call records, or other electronic evidence",
    "Identify defence witnesses and alibi documents",
    "Prepare the bail or anticipatory bail application",
    "Note hearing dates and limitation periods",
];

const CIVIL: [&str; 9] = [
    "Draft and verify the plaint or written statement",
    "Collect contracts, deeds, and correspondence",
    "Compile proof of payment and financial records",
    "Obtain title documents and revenue records",
    "Prepare the list of documents relied upon",
    "Identify witnesses and prepare affidavits",
    "Calculate court fees and valuation of the suit",
    "Check the limitation period for filing",
    "Consider interim relief or injunction applications",
];

const GENERAL: [&str; 9] = [
    "Collect all documents related to the dispute",
    "Prepare a chronology of events",
    "Identify all parties and their contact details",
    "Gather identity and address proofs",
    "Preserve emails, messages, and other correspondence",
    "Identify potential witnesses",
    "Check applicable limitation periods",
    "Consult on jurisdiction and the appropriate forum",
    "Explore settlement or mediation options",
];

/// The checklist for a case type.
pub fn checklist_for(case_type: &str) -> &'static [&'static str] {
    ChecklistKind::for_case_type(case_type).items()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criminal_case() {
        assert_eq!(ChecklistKind::for_case_type("Criminal Case"), ChecklistKind::Criminal);
        assert_eq!(checklist_for("Criminal Case"), &CRIMINAL);
    }

    #[test]
    fn test_civil_case_any_case() {
        assert_eq!(ChecklistKind::for_case_type("CIVIL SUIT"), ChecklistKind::Civil);
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(checklist_for("Property Dispute"), &GENERAL);
        assert_eq!(checklist_for(""), &GENERAL);
    }

    #[test]
    fn test_every_checklist_has_nine_items() {
        for kind in [
            ChecklistKind::Criminal,
            ChecklistKind::Civil,
            ChecklistKind::General,
        ] {
            assert_eq!(kind.items().len(), 9);
        }
    }
}
