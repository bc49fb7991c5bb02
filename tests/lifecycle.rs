#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use toaster::config::Config;
use toaster::render::{DocumentHandle, HtmlRenderer};
use toaster::{NoticeId, NoticeRequest, NoticeStatus, Notifier, Severity};

fn notifier() -> (Notifier, DocumentHandle) {
    let config = Config::default();
    let renderer = HtmlRenderer::new(&config);
    let document = renderer.document();
    let notifier = Notifier::new(config, Box::new(renderer)).expect("runtime available");
    (notifier, document)
}

async fn at(start: Instant, ms: u64) {
    sleep_until(start + Duration::from_millis(ms)).await;
}

fn mounted_ids(document: &DocumentHandle) -> Vec<NoticeId> {
    document
        .snapshot()
        .elements
        .values()
        .map(|e| e.notice_id)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn valid_notice_is_revealed_then_auto_dismissed() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let id = notifier
        .push(NoticeRequest::new("Saved").severity("success").duration_secs(1.0))
        .unwrap();
    assert_eq!(notifier.status(id), NoticeStatus::Queued);

    at(start, 1).await;
    assert_eq!(notifier.status(id), NoticeStatus::Active);
    let element = document.snapshot().element_for(id).cloned().unwrap();
    assert!(element.has_class("show"));
    assert!(element.has_class("success"));

    at(start, 1001).await;
    assert_eq!(notifier.status(id), NoticeStatus::Hiding);
    assert!(document.snapshot().element_for(id).unwrap().has_class("hide"));

    at(start, 1451).await;
    assert_eq!(notifier.status(id), NoticeStatus::Removed);
    assert!(document.snapshot().elements.is_empty());
    assert_eq!(notifier.live_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn blank_messages_produce_nothing() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    notifier.add("", "info", 3.0, true);
    notifier.add("   ", "info", 3.0, true);
    assert!(notifier.push(NoticeRequest::default()).is_none());

    at(start, 10).await;
    assert!(notifier.notices().is_empty());
    assert_eq!(notifier.live_timers(), 0);
    assert!(document.snapshot().elements.is_empty());
}

#[tokio::test(start_paused = true)]
async fn invalid_severity_and_duration_are_coerced() {
    let (notifier, _document) = notifier();
    notifier.add("typed", "bogus-type", 2.0, true);
    notifier.add("negative", "info", -5.0, true);
    notifier.add("cased", "Success", 2.0, true);
    notifier.add("padded", " error ", 2.0, true);

    let notices = notifier.notices();
    assert_eq!(notices[0].severity, Severity::Info);
    assert_eq!(notices[0].duration, Duration::from_secs(2));
    assert_eq!(notices[1].duration, Duration::from_secs(3));
    assert_eq!(notices[2].severity, Severity::Info);
    assert_eq!(notices[3].severity, Severity::Info);
}

#[tokio::test(start_paused = true)]
async fn shortcuts_use_their_own_default_durations() {
    let (notifier, _document) = notifier();
    notifier.success("s", None);
    notifier.error("e", None);
    notifier.warning("w", None);
    notifier.info("i", None);
    notifier.error("custom", Some(1.5));

    let durations: Vec<_> = notifier
        .notices()
        .into_iter()
        .map(|n| (n.severity, n.duration))
        .collect();
    assert_eq!(
        durations,
        vec![
            (Severity::Success, Duration::from_secs(3)),
            (Severity::Error, Duration::from_secs(5)),
            (Severity::Warning, Duration::from_secs(4)),
            (Severity::Info, Duration::from_secs(3)),
            (Severity::Error, Duration::from_millis(1500)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn synchronous_burst_is_staggered_in_enqueue_order() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let ids: Vec<_> = ["one", "two", "three", "four"]
        .into_iter()
        .map(|m| notifier.push(NoticeRequest::new(m).duration_secs(0.0)).unwrap())
        .collect();

    at(start, 1).await;
    assert_eq!(mounted_ids(&document), ids[..1]);
    at(start, 151).await;
    assert_eq!(mounted_ids(&document), ids[..2]);
    at(start, 301).await;
    assert_eq!(mounted_ids(&document), ids[..3]);
    at(start, 451).await;
    assert_eq!(mounted_ids(&document), ids);
    assert!(ids.iter().all(|id| notifier.status(*id) == NoticeStatus::Active));
}

#[tokio::test]
async fn burst_interleaved_with_blocking_work_still_staggers() {
    let (notifier, _document) = notifier();
    let ids: Vec<_> = ["one", "two", "three", "four"]
        .into_iter()
        .map(|m| {
            let id = notifier.push(NoticeRequest::new(m).duration_secs(0.0)).unwrap();
            std::thread::sleep(Duration::from_millis(5));
            id
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(60)).await;
    let active: Vec<_> = ids
        .iter()
        .map(|id| notifier.status(*id) == NoticeStatus::Active)
        .collect();
    assert_eq!(active, [true, false, false, false]);
    notifier.destroy();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn multi_thread_runtime_is_rejected() {
    let config = Config::default();
    let renderer = HtmlRenderer::new(&config);
    let document = renderer.document();
    let result = Notifier::new(config, Box::new(renderer));
    assert!(matches!(result, Err(toaster::error::Error::Runtime(_))));
    let doc = document.snapshot();
    assert!(!doc.styles_injected);
    assert!(doc.container.is_none());
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_restart_the_stagger() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let first = notifier.push(NoticeRequest::new("first").duration_secs(0.0)).unwrap();
    at(start, 50).await;
    let second = notifier.push(NoticeRequest::new("second").duration_secs(0.0)).unwrap();

    at(start, 51).await;
    assert_eq!(notifier.status(first), NoticeStatus::Active);
    assert_eq!(notifier.status(second), NoticeStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn push_batch_renders_without_waiting_for_the_runtime() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let ids = notifier.push_batch([
        NoticeRequest::new("a"),
        NoticeRequest::new(" "),
        NoticeRequest::new("b"),
    ]);
    assert_eq!(ids.len(), 2);
    assert_eq!(notifier.live_timers(), 2);

    at(start, 151).await;
    assert!(ids.iter().all(|id| notifier.status(*id) == NoticeStatus::Active));
}

#[tokio::test(start_paused = true)]
async fn zero_duration_never_auto_dismisses() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let id = notifier.push(NoticeRequest::new("sticky").duration_secs(0.0)).unwrap();

    at(start, 60_000).await;
    assert_eq!(notifier.status(id), NoticeStatus::Active);
    assert_eq!(notifier.live_timers(), 0);

    notifier.close(id);
    at(start, 60_451).await;
    assert_eq!(notifier.status(id), NoticeStatus::Removed);
}

#[tokio::test(start_paused = true)]
async fn hover_pauses_and_restarts_the_full_duration() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let id = notifier.push(NoticeRequest::new("hover me").duration_secs(1.0)).unwrap();

    at(start, 500).await;
    notifier.pointer_enter(id);
    assert_eq!(notifier.live_timers(), 0);
    assert!(notifier.notices()[0].paused);

    at(start, 2000).await;
    assert_eq!(notifier.status(id), NoticeStatus::Active);

    notifier.pointer_leave(id);
    assert!(!notifier.notices()[0].paused);
    at(start, 2999).await;
    assert_eq!(notifier.status(id), NoticeStatus::Active);
    at(start, 3001).await;
    assert_eq!(notifier.status(id), NoticeStatus::Hiding);
}

#[tokio::test(start_paused = true)]
async fn repeated_pointer_leave_keeps_a_single_timer() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let id = notifier.push(NoticeRequest::new("wiggle").duration_secs(1.0)).unwrap();

    at(start, 100).await;
    notifier.pointer_leave(id);
    notifier.pointer_leave(id);
    assert_eq!(notifier.live_timers(), 1);

    at(start, 1099).await;
    assert_eq!(notifier.status(id), NoticeStatus::Active);
    at(start, 1101).await;
    assert_eq!(notifier.status(id), NoticeStatus::Hiding);
    assert_eq!(notifier.live_timers(), 1);
}

#[tokio::test(start_paused = true)]
async fn hover_is_ignored_for_sticky_notices() {
    let start = Instant::now();
    let (notifier, _document) = notifier();
    let id = notifier.push(NoticeRequest::new("sticky").duration_secs(0.0)).unwrap();

    at(start, 1).await;
    notifier.pointer_enter(id);
    notifier.pointer_leave(id);
    assert_eq!(notifier.live_timers(), 0);
    assert!(!notifier.notices()[0].paused);
}

#[tokio::test(start_paused = true)]
async fn manual_close_respects_closable() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let fixed = notifier
        .push(NoticeRequest::new("fixed").duration_secs(0.0).closable(false))
        .unwrap();
    let open = notifier.push(NoticeRequest::new("open").duration_secs(0.0)).unwrap();

    at(start, 151).await;
    notifier.close(fixed);
    notifier.close(open);
    notifier.close(open);
    assert_eq!(notifier.status(fixed), NoticeStatus::Active);
    assert_eq!(notifier.status(open), NoticeStatus::Hiding);
    assert!(!document.snapshot().element_for(fixed).unwrap().inner_html.contains("notify-close"));

    at(start, 602).await;
    assert_eq!(notifier.status(open), NoticeStatus::Removed);
    assert_eq!(mounted_ids(&document), vec![fixed]);
    assert_eq!(notifier.live_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn close_by_message_purges_every_phase() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let ids = notifier.push_batch([
        NoticeRequest::new("X").duration_secs(0.0),
        NoticeRequest::new("Y").duration_secs(0.0),
        NoticeRequest::new("X").duration_secs(0.0),
        NoticeRequest::new("X").duration_secs(0.0),
    ]);

    at(start, 151).await;
    assert_eq!(notifier.status(ids[0]), NoticeStatus::Active);
    assert_eq!(notifier.status(ids[2]), NoticeStatus::Queued);
    let pending = notifier.push(NoticeRequest::new("X")).unwrap();

    notifier.close_by_message("X");
    assert_eq!(notifier.status(pending), NoticeStatus::Removed);
    for id in [ids[0], ids[2], ids[3]] {
        assert_eq!(notifier.status(id), NoticeStatus::Removed);
    }
    assert_eq!(notifier.status(ids[1]), NoticeStatus::Active);
    assert_eq!(notifier.live_timers(), 0);
    assert_eq!(mounted_ids(&document), vec![ids[1]]);

    at(start, 2000).await;
    assert_eq!(mounted_ids(&document), vec![ids[1]]);
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_by_message_skips_the_hide_transition() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let id = notifier.push(NoticeRequest::new("bye").duration_secs(1.0)).unwrap();

    at(start, 1001).await;
    assert_eq!(notifier.status(id), NoticeStatus::Hiding);
    notifier.close_by_message("bye");
    assert_eq!(notifier.status(id), NoticeStatus::Removed);
    assert!(document.snapshot().elements.is_empty());
    assert_eq!(notifier.live_timers(), 0);

    notifier.close_by_message("bye");
    notifier.close_by_message("never shown");
}

#[tokio::test(start_paused = true)]
async fn destroy_releases_everything_and_is_idempotent() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    notifier.push_batch([
        NoticeRequest::new("a"),
        NoticeRequest::new("b"),
        NoticeRequest::new("c"),
    ]);
    notifier.push(NoticeRequest::new("late"));

    at(start, 151).await;
    notifier.destroy();
    assert!(notifier.is_destroyed());
    assert_eq!(notifier.live_timers(), 0);
    assert_eq!(notifier.active_count(), 0);
    assert_eq!(notifier.pending_count(), 0);
    let doc = document.snapshot();
    assert!(doc.container.is_none());
    assert!(!doc.styles_injected);
    assert!(doc.elements.is_empty());

    notifier.destroy();
    assert!(notifier.push(NoticeRequest::new("after")).is_none());
    at(start, 5000).await;
    assert!(document.snapshot().elements.is_empty());
}

#[tokio::test(start_paused = true)]
async fn markup_is_escaped() {
    let start = Instant::now();
    let (notifier, document) = notifier();
    let id = notifier
        .push(NoticeRequest::new("<script>x</script>\nline two"))
        .unwrap();

    at(start, 1).await;
    let html = document.snapshot().element_for(id).unwrap().inner_html.clone();
    assert!(html.contains("&lt;script&gt;x&lt;/script&gt;<br>line two"));
    assert!(!html.contains("<script>"));
}

#[tokio::test(start_paused = true)]
async fn flush_runs_the_render_pass_immediately() {
    let (notifier, _document) = notifier();
    notifier.push(NoticeRequest::new("a"));
    notifier.push(NoticeRequest::new("b"));
    assert_eq!(notifier.live_timers(), 0);

    notifier.flush();
    assert_eq!(notifier.live_timers(), 2);
    notifier.flush();
    assert_eq!(notifier.live_timers(), 2);
}

#[test]
fn construction_requires_a_runtime() {
    let config = Config::default();
    let renderer = HtmlRenderer::new(&config);
    let result = Notifier::new(config, Box::new(renderer));
    assert!(matches!(result, Err(toaster::error::Error::Runtime(_))));
}
