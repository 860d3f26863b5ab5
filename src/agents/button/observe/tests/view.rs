//! The button view actor driven by hand-fired timers against a fake counter service.
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use button_observer::{
    client::{CounterApi, FetchError},
    feed::{Yak, YakKind, YakSource, FEED_CAPACITY},
    observer::{
        watch_presses, ButtonView, ButtonViewArgs, ButtonViewMessage, ViewTiming, FEED_TIMER,
        FRAME_TIMER, POLL_TIMER,
    },
    render::{CountLine, Frame, Renderer},
    scheduler::ManualScheduler,
    view::{CountDisplay, ViewState},
};
use pushbutton::PressRequest;
use ractor::{call_t, Actor, ActorRef};
use tokio::{
    io::{duplex, AsyncWriteExt, BufReader},
    task::JoinHandle,
    time::sleep,
};

#[derive(Default)]
struct FakeCounter {
    count: AtomicU64,
    failing: AtomicBool,
    gets: AtomicUsize,
    presses: Mutex<Vec<PressRequest>>,
}

impl FakeCounter {
    fn with_count(count: u64) -> Arc<Self> {
        let fake = FakeCounter::default();
        fake.count.store(count, Ordering::SeqCst);
        Arc::new(fake)
    }
}

#[ractor::async_trait]
impl CounterApi for FakeCounter {
    async fn get_count(&self) -> Result<u64, FetchError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 500,
                error: "internal error".into(),
            });
        }
        Ok(self.count.load(Ordering::SeqCst))
    }

    async fn record_press(&self, press: PressRequest) -> Result<u64, FetchError> {
        self.presses.lock().unwrap().push(press);
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingRenderer {
    fn last(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame) {
        self.frames.lock().unwrap().push(frame.clone());
    }
}

struct Harness {
    view: ActorRef<ButtonViewMessage>,
    handle: JoinHandle<()>,
    api: Arc<FakeCounter>,
    scheduler: ManualScheduler<ButtonViewMessage>,
    renderer: RecordingRenderer,
}

async fn start_view(api: Arc<FakeCounter>, seed: u64) -> Harness {
    let scheduler = ManualScheduler::default();
    let renderer = RecordingRenderer::default();

    let args = ButtonViewArgs {
        api: api.clone(),
        scheduler: Box::new(scheduler.clone()),
        renderer: Box::new(renderer.clone()),
        yaks: YakSource::seeded(seed),
        timing: ViewTiming::default(),
    };

    let (view, handle) = Actor::spawn(None, ButtonView, args).await.unwrap();
    // post_start has run once the first request is answered
    state_of(&view).await;

    Harness {
        view,
        handle,
        api,
        scheduler,
        renderer,
    }
}

async fn state_of(view: &ActorRef<ButtonViewMessage>) -> ViewState {
    call_t!(view, ButtonViewMessage::GetState, 1000).unwrap()
}

async fn wait_for(
    view: &ActorRef<ButtonViewMessage>,
    check: impl Fn(&ViewState) -> bool,
) -> ViewState {
    for _ in 0..200 {
        let state = state_of(view).await;
        if check(&state) {
            return state;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("view never reached the expected state");
}

#[tokio::test]
async fn fetches_on_start_and_schedules_its_timers() {
    let h = start_view(FakeCounter::with_count(42), 1).await;

    wait_for(&h.view, |s| s.latest_count() == Some(42)).await;
    assert!(h.api.gets.load(Ordering::SeqCst) >= 1);

    let timing = ViewTiming::default();
    assert_eq!(h.scheduler.period(POLL_TIMER), Some(timing.poll));
    assert_eq!(h.scheduler.period(FEED_TIMER), Some(timing.feed));
    assert_eq!(h.scheduler.period(FRAME_TIMER), Some(Duration::from_millis(100)));

    let first = h.renderer.frames.lock().unwrap().first().cloned().unwrap();
    assert_eq!(first.count, CountLine::Loading);

    h.view.stop(None);
    h.handle.await.unwrap();
}

#[tokio::test]
async fn poll_tick_picks_up_a_new_count() {
    let h = start_view(FakeCounter::with_count(1), 2).await;
    wait_for(&h.view, |s| s.latest_count() == Some(1)).await;

    h.api.count.store(5, Ordering::SeqCst);
    assert!(h.scheduler.fire(POLL_TIMER));

    wait_for(&h.view, |s| s.latest_count() == Some(5)).await;

    h.view.stop(None);
    h.handle.await.unwrap();
}

#[tokio::test]
async fn failed_fetch_hides_the_count_until_the_service_recovers() {
    let h = start_view(FakeCounter::with_count(9), 3).await;
    wait_for(&h.view, |s| s.latest_count() == Some(9)).await;

    h.api.failing.store(true, Ordering::SeqCst);
    h.scheduler.fire(POLL_TIMER);

    let state = wait_for(&h.view, |s| matches!(s.count, CountDisplay::Unavailable(_))).await;
    assert_eq!(state.latest_count(), None);
    assert!(matches!(
        h.renderer.last().unwrap().count,
        CountLine::Unavailable(_)
    ));

    h.api.failing.store(false, Ordering::SeqCst);
    h.scheduler.fire(POLL_TIMER);

    wait_for(&h.view, |s| s.latest_count() == Some(9)).await;

    h.view.stop(None);
    h.handle.await.unwrap();
}

#[tokio::test]
async fn press_adds_a_button_yak_records_and_refetches() {
    let h = start_view(FakeCounter::with_count(3), 4).await;
    wait_for(&h.view, |s| s.latest_count() == Some(3)).await;

    h.view.send_message(ButtonViewMessage::Press).unwrap();

    let state = wait_for(&h.view, |s| s.latest_count() == Some(4)).await;
    let yaks: Vec<&Yak> = state.feed.iter().collect();
    assert_eq!(yaks.len(), 1);
    assert!(yaks[0].button);

    let presses = h.api.presses.lock().unwrap().clone();
    assert_eq!(presses.len(), 1);
    let ts = presses[0].ts.clone().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());

    h.view.stop(None);
    h.handle.await.unwrap();
}

#[tokio::test]
async fn feed_keeps_the_four_newest_yaks() {
    let seed = 5;
    let h = start_view(FakeCounter::with_count(0), seed).await;

    for _ in 0..5 {
        assert!(h.scheduler.fire(FEED_TIMER));
    }

    // the ticks are already queued ahead of this request
    let state = state_of(&h.view).await;
    let shown: Vec<Yak> = state.feed.iter().cloned().collect();

    let mut expected = YakSource::seeded(seed);
    let made: Vec<Yak> = (0..5).map(|_| expected.next(YakKind::Basic)).collect();

    assert_eq!(shown.len(), FEED_CAPACITY);
    assert_eq!(shown, made[1..]);
    assert!(shown.iter().all(|yak| !yak.button));

    h.view.stop(None);
    h.handle.await.unwrap();
}

#[tokio::test]
async fn stopping_the_view_cancels_its_timers() {
    let h = start_view(FakeCounter::with_count(0), 6).await;
    assert!(h.scheduler.is_scheduled(POLL_TIMER));

    h.view.stop(None);
    h.handle.await.unwrap();

    assert!(!h.scheduler.is_scheduled(POLL_TIMER));
    assert!(!h.scheduler.is_scheduled(FEED_TIMER));
    assert!(!h.scheduler.is_scheduled(FRAME_TIMER));
    assert!(!h.scheduler.fire(POLL_TIMER));
}

#[tokio::test]
async fn input_lines_press_and_end_of_input_stops_the_view() {
    let Harness {
        view,
        handle,
        api,
        scheduler,
        ..
    } = start_view(FakeCounter::with_count(0), 7).await;

    let (mut keyboard, input) = duplex(64);
    let watcher = tokio::spawn(watch_presses(view.clone(), handle, BufReader::new(input)));

    keyboard.write_all(b"\n").await.unwrap();
    wait_for(&view, |s| s.latest_count() == Some(1)).await;
    assert_eq!(api.presses.lock().unwrap().len(), 1);

    drop(keyboard);
    watcher.await.unwrap();

    assert!(!scheduler.is_scheduled(POLL_TIMER));
    assert!(view.send_message(ButtonViewMessage::Press).is_err());
}
