use crate::models::RiskAssessment;

pub const SYSTEM_MESSAGE: &str = "Tu es un expert en data business.";

pub fn risk_line(assessment: &RiskAssessment) -> String {
    match assessment {
        RiskAssessment::Scored { .. } => format!(
            "Risque estimé de sous-performance : {:.1} %",
            assessment.probability() * 100.0
        ),
        RiskAssessment::InsufficientHistory => {
            "Risque estimé de sous-performance : historique insuffisant".to_string()
        }
    }
}

pub fn build_user_prompt(summary: &str, assessment: &RiskAssessment) -> String {
    let mut prompt = String::from(
        "Tu es un analyste expert. Voici un tableau de données de ventes :\n\n",
    );
    prompt.push_str(summary.trim_end());
    prompt.push_str("\n\n");
    prompt.push_str(&risk_line(assessment));
    prompt.push_str("\n\n");

    prompt.push_str(
        "Merci de :\n\
         1. Résumer les tendances principales\n\
         2. Détecter les anomalies\n\
         3. Donner 3 recommandations concrètes et actionnables\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_summary_and_risk() {
        let prompt = build_user_prompt(
            "ca: count 2, mean 150.00\n",
            &RiskAssessment::Scored { probability: 0.25 },
        );
        assert!(prompt.contains("ca: count 2, mean 150.00"));
        assert!(prompt.contains("Risque estimé de sous-performance : 25.0 %"));
        assert!(prompt.ends_with("actionnables\n"));
    }

    #[test]
    fn insufficient_history_is_spelled_out() {
        let prompt = build_user_prompt("x", &RiskAssessment::InsufficientHistory);
        assert!(prompt.contains("historique insuffisant"));
        assert!(!prompt.contains('%'));
    }
}
