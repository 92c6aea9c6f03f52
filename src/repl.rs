//! Interactive question loop over a loaded ontology.
//!
//! One turn per input line: classify the text onto a declared concept, then
//! render ranked recommendations, or fall back to a general reply when the
//! concept is outside the ontology. A collaborator failure aborts the turn,
//! not the process.

use std::io::Write;

use crate::error::PanakeiaResult;
use crate::llm::LlmClient;
use crate::ontology::Ontology;
use crate::recommend::{Recommendation, Recommender};

const PROMPT: &str = "Enter a medical concept or question (or 'q' to quit): ";
const SEPARATOR: &str = "--------------------";
const NO_RECOMMENDATIONS: &str = "No recommendations found for this concept within the ontology.";

/// Run the loop until `q` (any case) or EOF.
pub fn run(ontology: &Ontology, client: &LlmClient) -> PanakeiaResult<()> {
    let recommender = Recommender::new(ontology, client, client);

    loop {
        print!("{PROMPT}");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed, leaving repl");
                break;
            }
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") {
            break;
        }

        if let Err(e) = turn(&recommender, client, input) {
            eprintln!("{:?}", miette::Report::new(e));
        }
        println!("{SEPARATOR}");
    }
    Ok(())
}

fn turn(
    recommender: &Recommender<'_>,
    client: &LlmClient,
    input: &str,
) -> PanakeiaResult<()> {
    match recommender.resolve_input(input)? {
        Some(concept) => {
            let recommendations = recommender.recommend(concept)?;
            println!("{}", render_recommendations(&recommendations));
        }
        None => {
            let response = client.unknown_concept_reply(input)?;
            println!("\nResponse:\n{response}");
        }
    }
    Ok(())
}

/// Render recommendations the way the loop prints them: a `Recommendations:`
/// heading with one `- label: explanation` line per entry, or the fallback
/// line when there are none.
pub fn render_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return NO_RECOMMENDATIONS.to_string();
    }
    let mut out = String::from("\nRecommendations:");
    for rec in recommendations {
        out.push_str(&format!("\n- {}: {}", rec.label, rec.explanation));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_recommendations_one_per_line() {
        let recs = vec![
            Recommendation {
                label: "Insulin".into(),
                explanation: "Insulin treats Diabetes.".into(),
            },
            Recommendation {
                label: "Thirst".into(),
                explanation: "Thirst is a symptom of Diabetes.".into(),
            },
        ];
        assert_eq!(
            render_recommendations(&recs),
            "\nRecommendations:\n\
             - Insulin: Insulin treats Diabetes.\n\
             - Thirst: Thirst is a symptom of Diabetes."
        );
    }

    #[test]
    fn empty_recommendations_get_the_fallback_line() {
        assert_eq!(render_recommendations(&[]), NO_RECOMMENDATIONS);
    }

    #[test]
    fn separator_is_twenty_dashes() {
        assert_eq!(SEPARATOR.len(), 20);
        assert!(SEPARATOR.chars().all(|c| c == '-'));
    }

    #[test]
    fn prompt_spells_out_the_quit_key() {
        assert!(PROMPT.contains("'q' to quit"));
        assert!(PROMPT.ends_with(": "));
    }
}
