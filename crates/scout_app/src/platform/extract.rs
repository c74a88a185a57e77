//! `scout extract`: runs one extraction on a saved page, printing which
//! strategies were tried. Useful when LinkedIn changes its markup.
use std::fs;

use anyhow::{Context, Result};
use scout_core::{Attempt, ExtractionResult, OperationResult};
use scout_engine::extract::{
    company_name_cascade, extract_job_posting, job_list_cascade, ButtonTextDetector, FollowDetector,
};
use scout_engine::page::DomSnapshot;
use serde::Serialize;
use serde_json::{json, Value};

use super::app::print_result;
use crate::cli::{ExtractArgs, Goal};

#[derive(Debug, Serialize)]
struct ExtractOutput {
    goal: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<&'static str>,
    value: Value,
    attempts: Vec<String>,
}

pub(super) fn run(args: ExtractArgs) -> Result<bool> {
    let html = fs::read_to_string(&args.html).with_context(|| format!("cannot read {}", args.html.display()))?;
    print_result(&extract(args.goal, &args.url, &html)?)
}

fn extract(goal: Goal, url: &str, html: &str) -> Result<OperationResult<ExtractOutput>> {
    let snapshot = DomSnapshot::parse(url, html);
    let output = match goal {
        Goal::Company => {
            let (result, attempts) = company_name_cascade().extract_traced(&snapshot);
            traced("company name", result, &attempts)?
        }
        Goal::Jobs => {
            let (result, attempts) = job_list_cascade().extract_traced(&snapshot);
            traced("job listings", result, &attempts)?
        }
        Goal::Follow => {
            let detector = ButtonTextDetector::default();
            if detector.already_following(&snapshot) {
                ExtractOutput {
                    goal: "follow button",
                    strategy: None,
                    value: json!({ "already_following": true }),
                    attempts: Vec::new(),
                }
            } else {
                let target = detector.follow_button(&snapshot);
                ExtractOutput {
                    goal: "follow button",
                    strategy: target.strategy(),
                    value: match target.into_option() {
                        Some(target) => json!({
                            "already_following": false,
                            "locator": target.locator.to_string(),
                            "label": target.label,
                        }),
                        None => Value::Null,
                    },
                    attempts: Vec::new(),
                }
            }
        }
        Goal::Posting => ExtractOutput {
            goal: "job posting",
            strategy: None,
            value: serde_json::to_value(extract_job_posting(url, html))?,
            attempts: Vec::new(),
        },
    };
    Ok(if output.value.is_null() {
        OperationResult::failure(format!("no {} found", output.goal)).with_data(output)
    } else {
        OperationResult::ok(output)
    })
}

fn traced<T: Serialize>(
    goal: &'static str,
    result: ExtractionResult<T>,
    attempts: &[Attempt],
) -> Result<ExtractOutput> {
    Ok(ExtractOutput {
        goal,
        strategy: result.strategy(),
        value: serde_json::to_value(result.into_option())?,
        attempts: attempts
            .iter()
            .map(|attempt| format!("{}: {}", attempt.strategy, attempt.outcome))
            .collect(),
    })
}
