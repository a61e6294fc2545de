//! Projection of the record stream onto the runtime step/suggestion tables.

use super::{CompileError, CompileResult, Record, Runbook, Step, StepStatus, Suggestion};

/// Build the runtime tables from a record stream.
///
/// Steps are numbered in order of appearance and suggestions take global
/// offsets in first-seen order, so every step owns one contiguous slice.
pub fn build_runbook(records: &[Record]) -> CompileResult<Runbook> {
    let mut runbook = Runbook::default();
    let mut open: Option<Step> = None;

    for record in records {
        match record {
            Record::Step { title } => {
                if let Some(step) = open.take() {
                    return Err(CompileError::MalformedIr(format!(
                        "step '{}' was never closed",
                        step.title
                    )));
                }
                open = Some(Step {
                    title: title.clone(),
                    description: None,
                    status: StepStatus::Todo,
                    start: runbook.suggestions.len(),
                    len: 0,
                });
            }
            Record::Description { text } => {
                let step = open.as_mut().ok_or_else(|| orphan("description"))?;
                step.description = Some(text.clone());
            }
            Record::Suggestion { kind, note, body } => {
                let step = open.as_mut().ok_or_else(|| orphan("suggestion"))?;
                step.len += 1;
                runbook.suggestions.push(Suggestion {
                    kind: *kind,
                    note: note.clone(),
                    body: body.clone(),
                });
            }
            Record::EndOfStep => {
                let step = open.take().ok_or_else(|| orphan("end of step"))?;
                runbook.steps.push(step);
            }
        }
    }

    if let Some(step) = open {
        return Err(CompileError::MalformedIr(format!("step '{}' was never closed", step.title)));
    }
    if runbook.steps.is_empty() {
        return Err(CompileError::NoSteps);
    }

    Ok(runbook)
}

fn orphan(what: &str) -> CompileError {
    CompileError::MalformedIr(format!("{what} outside of a step"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runbook::{parse_runbook_str, SuggestionKind};

    #[test]
    fn test_offsets_are_contiguous() {
        let spec = r"
step: One
suggestions:
  - cmd: a
  - cmd: b
---
step: Two
---
step: Three
suggestion:
  kind: snippet
  content: c
";

        let records = parse_runbook_str(spec).unwrap();
        let runbook = build_runbook(&records).unwrap();

        assert_eq!(runbook.step_count(), 3);
        assert_eq!((runbook.steps[0].start, runbook.steps[0].len), (0, 2));
        assert_eq!((runbook.steps[1].start, runbook.steps[1].len), (2, 0));
        assert_eq!((runbook.steps[2].start, runbook.steps[2].len), (2, 1));
        assert_eq!(runbook.suggestions[2].kind, SuggestionKind::Snippet);
        assert!(runbook.steps.iter().all(|s| s.status == StepStatus::Todo));
    }

    #[test]
    fn test_slices_partition_the_table() {
        let spec = r"
step: A
suggestions:
  - cmd: 1
---
step: B
suggestions:
  - cmd: 2
  - cmd: 3
  - cmd: 4
---
step: C
---
step: D
suggestions:
  - cmd: 5
";

        let runbook = build_runbook(&parse_runbook_str(spec).unwrap()).unwrap();

        let mut covered = vec![0; runbook.suggestions.len()];
        for step in &runbook.steps {
            for i in step.suggestion_range() {
                covered[i] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));

        let bodies: Vec<_> = runbook.suggestions.iter().map(|s| s.body.as_str()).collect();
        assert_eq!(bodies, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_title_and_description_round_trip() {
        let spec = "step: Configure the thing\ndesc: |\n Line one\n   keep indent\n\n Line four\n";

        let runbook = build_runbook(&parse_runbook_str(spec).unwrap()).unwrap();
        let first = runbook.step(1).unwrap();
        assert_eq!(first.title, "Configure the thing");
        assert_eq!(first.description.as_deref(), Some("Line one\n  keep indent\n\nLine four"));
    }

    #[test]
    fn test_rejects_orphan_records() {
        let records = vec![Record::Description { text: "x".to_string() }];
        assert!(matches!(build_runbook(&records), Err(CompileError::MalformedIr(_))));

        let records = vec![Record::Step { title: "a".to_string() }];
        assert!(matches!(build_runbook(&records), Err(CompileError::MalformedIr(_))));

        assert!(matches!(build_runbook(&[]), Err(CompileError::NoSteps)));
    }
}
