//! Property-based tests for the turn pipeline
//!
//! - Quick-reply extraction never panics on arbitrary JSON
//! - Well-formed option lists come back complete and in order
//! - Display text is never empty
//! - The log alternates user/assistant for any input sequence

use super::executor::{extract_display_text, extract_quick_replies, IntentTarget};
use super::log::Role;
use super::turn_loop::{Conversation, TurnLoop};
use crate::intent::testing::MockIntentService;
use crate::session::new_session_id;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Strategies
// ============================================================================

/// Arbitrary JSON tree, biased toward the keys the extractor looks for
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ];
    let key = prop_oneof![
        Just("fulfillmentText".to_string()),
        Just("fulfillmentMessages".to_string()),
        Just("payload".to_string()),
        Just("richContent".to_string()),
        Just("options".to_string()),
        Just("text".to_string()),
        "[a-z]{1,8}",
    ];
    leaf.prop_recursive(6, 64, 6, move |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::vec((key.clone(), inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

fn arb_labels() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Za-z][A-Za-z &]{0,20}", 0..8)
}

/// Sequence of user inputs, some blank
fn arb_inputs() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            3 => "[A-Za-z][A-Za-z ?]{0,30}",
            1 => "[ \t]{0,4}",
        ],
        0..10,
    )
}

fn chips(text: &str, labels: &[String]) -> Value {
    let options: Vec<Value> = labels.iter().map(|l| json!({ "text": l })).collect();
    json!({
        "fulfillmentText": text,
        "fulfillmentMessages": [
            { "text": { "text": [text] } },
            { "payload": { "richContent": [[{ "type": "chips", "options": options }]] } }
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn extraction_never_panics(value in arb_json()) {
        let _ = extract_quick_replies(&value);
        prop_assert!(!extract_display_text(&value).is_empty());
    }

    #[test]
    fn well_formed_options_are_extracted_in_order(labels in arb_labels()) {
        let value = chips("Choose one", &labels);
        prop_assert_eq!(extract_quick_replies(&value), labels);
    }

    #[test]
    fn one_bad_option_discards_all(labels in arb_labels(), bad_at in 0usize..8) {
        let mut options: Vec<Value> = labels.iter().map(|l| json!({ "text": l })).collect();
        let idx = bad_at.min(options.len());
        options.insert(idx, json!({ "title": "no text here" }));
        let value = json!({
            "fulfillmentMessages": [
                {},
                { "payload": { "richContent": [[{ "options": options }]] } }
            ]
        });
        prop_assert!(extract_quick_replies(&value).is_empty());
    }

    #[test]
    fn log_alternates_for_any_inputs(inputs in arb_inputs()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let mock = Arc::new(MockIntentService::new());
            for i in 0..=inputs.len() {
                mock.queue_text(&format!("reply {i}"));
            }
            let turn_loop = TurnLoop::new(
                mock.clone(),
                IntentTarget {
                    project_id: "p".to_string(),
                    language_code: "en-US".to_string(),
                    timeout: Duration::from_secs(5),
                },
            );
            let conv = Conversation::new(new_session_id());

            turn_loop.start_conversation(&conv).await.unwrap();
            for input in &inputs {
                turn_loop.submit_user_text(&conv, input).await.unwrap();
            }

            let turns = conv.snapshot().turns;
            let non_blank = inputs.iter().filter(|i| !i.trim().is_empty()).count();
            assert_eq!(turns.len(), 2 * (non_blank + 1));
            assert_eq!(mock.call_count(), non_blank + 1);
            for (i, turn) in turns.iter().enumerate() {
                let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
                assert_eq!(turn.role, expected);
                if turn.role == Role::Assistant {
                    assert!(!turn.text.is_empty());
                }
            }
        });
    }
}
