//! Tests for the suggestion state machine

use super::*;
use crate::provider::ProviderError;
use crate::test_utils::test_helpers::*;
use proptest::prelude::*;

const PANGRAM: &str = "The quick brown fox jumps over the lazy dog";

fn edit(engine: &mut SuggestionEngine<FakeHost>, text: &str) {
    engine.host_mut().type_text(text);
    engine.on_edit();
}

/// Engine sitting in Ready with `suggestion` for `text`
async fn ready_engine(text: &str, suggestion: &str) -> SuggestionEngine<FakeHost> {
    let mut engine = attach_engine(FakeHost::default(), ScriptedProvider::replying(suggestion));
    edit(&mut engine, text);
    settle(&mut engine).await;
    assert_eq!(engine.state().lifecycle(), Lifecycle::Ready);
    engine
}

#[test]
fn test_attach_starts_idle_and_focused() {
    let engine = attach_engine(FakeHost::with_text("Hello"), ScriptedProvider::replying("x"));

    let state = engine.state();
    assert_eq!(state.lifecycle(), Lifecycle::Idle);
    assert!(state.has_focus());
    assert_eq!(state.request_sequence(), 0);
    assert!(state.pending_timer().is_none());
    assert!(state.active_token().is_none());
    assert!(engine.overlay().is_none());
    assert_eq!(engine.provider_name(), "Scripted");
}

#[test]
fn test_settings_from_config() {
    let settings = EngineSettings::from_config(&test_config());

    assert_eq!(settings.debounce, Duration::from_millis(TEST_DEBOUNCE_MS));
    assert_eq!(settings.min_fragment_length, 3);
    assert_eq!(settings.fetch_timeout, Some(Duration::from_millis(8000)));
    assert_eq!(settings.presentation.badge_label, "Tab");
}

#[test]
fn test_settings_zero_timeout_disables_bound() {
    let config = SuggestionConfig {
        fetch_timeout_ms: 0,
        badge_label: Some("  ".to_string()),
        ..test_config()
    };

    let settings = EngineSettings::from_config(&config);

    assert_eq!(settings.fetch_timeout, None);
    // Blank badge falls back to the accept key
    assert_eq!(settings.presentation.badge_label, "Tab");
}

#[tokio::test(start_paused = true)]
async fn test_edit_starts_debounce_without_fetching() {
    let provider = ScriptedProvider::replying("ld");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");

    assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
    assert!(engine.state().pending_timer().is_some());
    assert_eq!(engine.state().request_sequence(), 1);

    advance(TEST_DEBOUNCE_MS - 100).await;
    engine.poll();
    assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_quiet_period_fetches_and_shows_overlay() {
    let provider = ScriptedProvider::replying("ld");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;

    assert_eq!(provider.calls(), vec![("Hello wor".to_string(), 9)]);
    assert_eq!(engine.state().lifecycle(), Lifecycle::Ready);
    assert_eq!(engine.state().suggestion_text(), "ld");

    let overlay = engine.overlay().unwrap();
    assert_eq!(overlay.anchor_offset, 9);
    assert_eq!(overlay.ghost_text, "ld");
    assert_eq!(engine.host().last_render(), Some(&Some(overlay)));
}

#[tokio::test(start_paused = true)]
async fn test_overlay_published_only_on_change() {
    let mut engine = ready_engine("Hello wor", "ld").await;

    // Debouncing and Fetching have no overlay, so Ready is the first render
    assert_eq!(engine.host().renders.len(), 1);

    engine.on_dismiss_key();
    assert_eq!(engine.host().renders.len(), 2);
    assert_eq!(engine.host().last_render(), Some(&None));

    engine.on_selection_change();
    assert_eq!(engine.host().renders.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_issue_one_fetch_with_final_text() {
    let provider = ScriptedProvider::replying(" dog");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    for text in ["The l", "The la", "The laz", "The lazy"] {
        edit(&mut engine, text);
        advance(100).await;
        engine.poll();
        assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
    }
    settle(&mut engine).await;

    assert_eq!(provider.calls(), vec![("The lazy".to_string(), 8)]);
    assert_eq!(engine.state().suggestion_text(), " dog");
}

#[tokio::test(start_paused = true)]
async fn test_sentence_end_does_not_fetch() {
    let provider = ScriptedProvider::replying("x");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Done.");
    settle(&mut engine).await;

    assert_eq!(provider.call_count(), 0);
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.state().pending_timer().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_short_fragment_does_not_fetch() {
    let provider = ScriptedProvider::replying("x");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hi");
    settle(&mut engine).await;

    assert_eq!(provider.call_count(), 0);
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_pangram_accept_appends_suggestion() {
    let provider = ScriptedProvider::replying(" and runs away.");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, PANGRAM);
    settle(&mut engine).await;

    assert_eq!(provider.calls(), vec![(PANGRAM.to_string(), 43)]);
    assert_eq!(engine.overlay().unwrap().anchor_offset, 43);

    assert!(engine.on_accept_key());

    let host = engine.host();
    assert_eq!(
        host.text,
        "The quick brown fox jumps over the lazy dog and runs away."
    );
    assert_eq!(host.cursor, 58);
    assert_eq!(host.inserted, vec![" and runs away.".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_accept_clears_overlay_before_inserting() {
    let mut engine = ready_engine("Hello wor", "ld").await;

    assert!(engine.on_accept_key());

    let host = engine.host();
    assert_eq!(host.text, "Hello world");
    assert_eq!(host.last_render(), Some(&None));
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.state().suggestion_text().is_empty());
    assert!(engine.state().is_consistent());

    // Nothing left to accept
    assert!(!engine.on_accept_key());
    assert_eq!(engine.host().inserted.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_accept_passes_through_unless_ready() {
    let mut engine = attach_engine(FakeHost::default(), ScriptedProvider::replying("ld"));
    assert!(!engine.on_accept_key());

    edit(&mut engine, "Hello wor");
    assert!(!engine.on_accept_key());
    assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
    assert!(engine.host().inserted.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_ready_suggestion() {
    let mut engine = ready_engine("Hello wor", "ld").await;
    let sequence = engine.state().request_sequence();

    assert!(engine.on_dismiss_key());

    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.state().request_sequence() > sequence);
    assert!(engine.overlay().is_none());
    assert_eq!(engine.host().text, "Hello wor");
    assert!(!engine.on_dismiss_key());
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_while_debouncing_cancels_timer() {
    let provider = ScriptedProvider::replying("ld");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    assert!(engine.on_dismiss_key());
    settle(&mut engine).await;

    assert_eq!(provider.call_count(), 0);
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_edit_during_fetch_discards_old_result() {
    let (provider, mut pending) = ManualProvider::new();
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hel");
    settle(&mut engine).await;
    assert_eq!(engine.state().lifecycle(), Lifecycle::Fetching);
    let first = pending.try_recv().unwrap();
    assert_eq!(first.text, "Hel");

    edit(&mut engine, "Hello");
    assert!(first.token.is_cancelled());
    first.resolve("p me");
    advance(1).await;
    engine.poll();

    assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
    assert!(engine.host().renders.is_empty());

    settle(&mut engine).await;
    let second = pending.try_recv().unwrap();
    assert_eq!(second.text, "Hello");
    second.resolve(" world");
    advance(1).await;
    engine.poll();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(engine.state().suggestion_text(), " world");
    assert_eq!(engine.overlay().unwrap().ghost_text, " world");
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_is_fenced() {
    let (provider, mut pending) = ManualProvider::new();
    let mut engine = attach_engine(FakeHost::default(), provider);

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;
    let fetch = pending.try_recv().unwrap();
    let stale = engine.state().request_sequence() - 1;

    engine.on_fetch_resolved(stale, FetchOutcome::Suggestion("ld".to_string()));

    assert_eq!(engine.state().lifecycle(), Lifecycle::Fetching);
    assert!(engine.host().renders.is_empty());
    assert!(!fetch.token.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_result_after_settled_fetch_is_ignored() {
    let mut engine = ready_engine("Hello wor", "ld").await;
    let sequence = engine.state().request_sequence();

    engine.on_fetch_resolved(sequence, FetchOutcome::Suggestion("other".to_string()));

    assert_eq!(engine.state().suggestion_text(), "ld");
    assert_eq!(engine.host().renders.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_provider_error_returns_to_idle() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Api {
        provider: "Scripted".to_string(),
        code: 500,
        message: "boom".to_string(),
    })]);
    let mut engine = attach_engine(FakeHost::default(), provider);

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;

    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.state().active_token().is_none());
    assert!(engine.host().renders.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_suggestion_returns_to_idle() {
    let mut engine = attach_engine(FakeHost::default(), ScriptedProvider::replying("  \n"));

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;

    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.overlay().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_selection_change_withdraws_suggestion() {
    let mut engine = ready_engine("Hello wor", "ld").await;

    engine.host_mut().cursor = 2;
    engine.on_selection_change();

    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert_eq!(engine.host().last_render(), Some(&None));
}

#[tokio::test(start_paused = true)]
async fn test_selection_change_cancels_debounce() {
    let provider = ScriptedProvider::replying("ld");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    engine.on_selection_change();
    settle(&mut engine).await;

    assert_eq!(provider.call_count(), 0);
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_focus_loss_cancels_fetch() {
    let (provider, mut pending) = ManualProvider::new();
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;
    let fetch = pending.try_recv().unwrap();

    engine.on_focus_change(false);
    assert!(fetch.token.is_cancelled());
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(!engine.state().has_focus());

    fetch.resolve("ld");
    advance(1).await;
    engine.poll();
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);

    // Edits while unfocused do not schedule anything
    edit(&mut engine, "Hello worl");
    settle(&mut engine).await;
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert_eq!(provider.call_count(), 1);

    engine.on_focus_change(true);
    edit(&mut engine, "Hello worl");
    assert_eq!(engine.state().lifecycle(), Lifecycle::Debouncing);
}

#[tokio::test(start_paused = true)]
async fn test_focus_loss_hides_ready_overlay() {
    let mut engine = ready_engine("Hello wor", "ld").await;

    engine.on_focus_change(false);

    assert!(engine.overlay().is_none());
    assert_eq!(engine.host().last_render(), Some(&None));
    assert!(!engine.on_accept_key());
}

#[tokio::test(start_paused = true)]
async fn test_detach_cancels_pending_work() {
    let (provider, mut pending) = ManualProvider::new();
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    settle(&mut engine).await;
    let fetch = pending.try_recv().unwrap();

    let host = engine.detach();

    assert!(fetch.token.is_cancelled());
    assert!(host.renders.is_empty());
    assert!(host.inserted.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_detach_stops_armed_timer() {
    let provider = ScriptedProvider::replying("ld");
    let mut engine = attach_engine(FakeHost::default(), provider.clone());

    edit(&mut engine, "Hello wor");
    let host = engine.detach();
    advance(TEST_DEBOUNCE_MS * 3).await;

    assert_eq!(provider.call_count(), 0);
    assert_eq!(host.text, "Hello wor");
}

#[tokio::test(start_paused = true)]
async fn test_detach_withdraws_visible_overlay() {
    let engine = ready_engine("Hello wor", "ld").await;

    let host = engine.detach();

    assert_eq!(host.renders.len(), 2);
    assert_eq!(host.last_render(), Some(&None));
}

#[test]
fn test_disabled_engine_is_inert() {
    let config = SuggestionConfig {
        enabled: false,
        ..test_config()
    };
    let provider = ScriptedProvider::replying("ld");
    let mut engine =
        SuggestionEngine::attach(FakeHost::with_text("Hello wor"), provider.clone(), &config);

    // No runtime here: a disabled engine must not spawn anything
    engine.on_edit();
    engine.on_selection_change();
    engine.on_focus_change(false);
    assert!(!engine.on_accept_key());
    assert!(!engine.on_dismiss_key());
    engine.on_fetch_resolved(0, FetchOutcome::Suggestion("ld".to_string()));

    assert!(!engine.is_enabled());
    assert_eq!(engine.state().lifecycle(), Lifecycle::Idle);
    assert!(engine.state().has_focus());
    assert_eq!(engine.poll(), 0);
    assert!(engine.host().renders.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[derive(Debug, Clone)]
enum Op {
    Type(String),
    Select,
    Accept,
    Dismiss,
    Focus(bool),
    Wait(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => "[a-z .]{0,12}".prop_map(Op::Type),
        1 => Just(Op::Select),
        1 => Just(Op::Accept),
        1 => Just(Op::Dismiss),
        1 => any::<bool>().prop_map(Op::Focus),
        3 => (1u64..800).prop_map(Op::Wait),
    ]
}

// Whatever the interleaving of host reports and elapsed time, the state
// record stays consistent and the overlay matches the lifecycle.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_state_stays_consistent(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        runtime.block_on(async {
            let responses = (0..ops.len()).map(|_| Ok(" next".to_string())).collect();
            let mut engine = attach_engine(FakeHost::default(), ScriptedProvider::new(responses));
            let mut last_sequence = 0;

            for op in ops {
                match op {
                    Op::Type(text) => {
                        let text = format!("{}{}", engine.host().text, text);
                        edit(&mut engine, &text);
                    }
                    Op::Select => engine.on_selection_change(),
                    Op::Accept => {
                        engine.on_accept_key();
                    }
                    Op::Dismiss => {
                        engine.on_dismiss_key();
                    }
                    Op::Focus(has_focus) => engine.on_focus_change(has_focus),
                    Op::Wait(ms) => {
                        advance(ms).await;
                        engine.poll();
                    }
                }

                let state = engine.state();
                prop_assert!(state.is_consistent());
                prop_assert!(state.request_sequence() >= last_sequence);
                last_sequence = state.request_sequence();
                prop_assert_eq!(
                    engine.overlay().is_some(),
                    state.lifecycle() == Lifecycle::Ready
                );
                if !state.has_focus() {
                    prop_assert_eq!(state.lifecycle(), Lifecycle::Idle);
                }
                prop_assert_ne!(state.lifecycle(), Lifecycle::Dismissed);
            }
            Ok(())
        })?;
    }
}
