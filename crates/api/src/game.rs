use crate::{
    gateway::{self, Gateway, GatewayError},
    leaderboard,
    preload::{self, Fetch, ImageCache},
    view::{Board, ElementId, Screen, View},
};
use core::time::Duration;
use hyper::body::Bytes;
use model::{NewScore, Question};
use quiz::{Prompt, Session, Step, Tick, ValidationError, Verdict};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};

/// How long the verdict stays on screen before the next question.
pub const REVEAL_DELAY: Duration = Duration::from_secs(2);
const SECOND: Duration = Duration::from_secs(1);

/// A button press on the question at `question`.
struct Event {
    question: usize,
    button: usize,
}

/// The task driving the current session.
struct Run {
    id: u64,
    events: mpsc::UnboundedSender<Event>,
    handle: JoinHandle<()>,
}

struct State {
    view: View,
    questions: Arc<[Question]>,
    /// Player of the current or last session.
    player: Option<Box<str>>,
    /// Finished session kept around for a replay.
    last: Option<Session>,
    run: Option<Run>,
    /// Number of runs launched so far. Doubles as the next run's ID.
    runs: u64,
}

impl State {
    fn is_current(&self, id: u64) -> bool {
        self.run.as_ref().is_some_and(|run| run.id == id)
    }

    /// Aborts the running session, if any. Its task can no longer touch the view.
    fn discard_run(&mut self) {
        if let Some(run) = self.run.take() {
            run.handle.abort();
        }
    }

    /// Forgets the player and returns to an empty login form.
    fn reset(&mut self) {
        self.discard_run();
        self.player = None;
        self.last = None;
        self.view.set_input(ElementId::Username, "");
        self.view.show_screen(Screen::Login);
    }
}

struct Inner<G, F> {
    gateway: G,
    fetcher: F,
    images: ImageCache,
    /// Upper bound on every gateway call.
    timeout: Duration,
    state: Mutex<State>,
}

/// A single-player trivia game. Cloning yields another handle to the same game.
pub struct Game<G, F> {
    inner: Arc<Inner<G, F>>,
}

impl<G, F> Clone for Game<G, F> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<G: Gateway, F: Fetch> Game<G, F> {
    pub fn new(gateway: G, fetcher: F, timeout: Duration) -> Self {
        let state = State {
            view: View::default(),
            questions: Arc::from(Vec::new()),
            player: None,
            last: None,
            run: None,
            runs: 0,
        };
        let images = ImageCache::default();
        Self { inner: Arc::new(Inner { gateway, fetcher, images, timeout, state: Mutex::new(state) }) }
    }

    /// Copies the view for the browser, draining pending alerts.
    pub async fn snapshot(&self) -> View {
        self.inner.state.lock().await.view.snapshot()
    }

    /// Reads the view without draining anything.
    #[cfg(test)]
    pub(crate) async fn view<T>(&self, read: impl FnOnce(&View) -> T) -> T {
        read(&self.inner.state.lock().await.view)
    }

    /// Types into the login form.
    pub async fn set_username(&self, name: &str) {
        self.inner.state.lock().await.view.set_input(ElementId::Username, name);
    }

    /// Cached bytes of the image for question `index`.
    pub async fn image(&self, index: usize) -> Option<Bytes> {
        let state = self.inner.state.lock().await;
        let url = state.questions.get(index)?.image()?;
        self.inner.images.get(url)
    }

    /// Discards any session and shows the login screen, then loads the
    /// questions and the leaderboard. Images are preloaded in the background.
    pub async fn init_game(&self) {
        self.inner.state.lock().await.reset();
        if self.load_questions().await.is_ok() {
            self.spawn_preload().await;
        }
        self.load_leaderboard().await;
    }

    /// Replaces the question list. On failure the list is left empty so that
    /// starting a game is refused.
    pub async fn load_questions(&self) -> gateway::Result<usize> {
        let result = gateway::bounded(self.inner.timeout, self.inner.gateway.questions()).await;
        let mut state = self.inner.state.lock().await;
        match result {
            Ok(questions) => {
                log::info!("loaded {} questions", questions.len());
                let count = questions.len();
                state.questions = questions.into();
                Ok(count)
            }
            Err(err) => {
                log::error!("failed to load questions: {err}");
                state.questions = Arc::from(Vec::new());
                Err(err)
            }
        }
    }

    async fn spawn_preload(&self) {
        let urls: Vec<String> = {
            let state = self.inner.state.lock().await;
            state.questions.iter().filter_map(Question::image).map(String::from).collect()
        };

        if urls.is_empty() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            preload::preload(&inner.fetcher, &inner.images, urls).await;
        });
    }

    /// Top five scores for the login screen.
    pub async fn load_leaderboard(&self) {
        let board = self.fetch_board(leaderboard::TOP_SCORES, false).await;
        self.inner.state.lock().await.view.set_board(ElementId::TopScores, board);
    }

    /// Top ten scores with timestamps for the results screen.
    pub async fn load_final_leaderboard(&self) {
        let board = self.fetch_board(leaderboard::FINAL_SCORES, true).await;
        self.inner.state.lock().await.view.set_board(ElementId::LeaderboardScores, board);
    }

    async fn fetch_board(&self, limit: u8, with_time: bool) -> Board {
        let result = gateway::bounded(self.inner.timeout, self.inner.gateway.top_scores(limit)).await;
        leaderboard::board(result, with_time)
    }

    /// Starts a session for whoever is typed into the login form.
    pub async fn start_game(&self) -> Result<(), ValidationError> {
        let mut state = self.inner.state.lock().await;
        let player = state.view.input(ElementId::Username).to_owned();
        let session = match Session::new(&player, Arc::clone(&state.questions)) {
            Ok(session) => session,
            Err(err) => {
                state.view.alert(err.to_string());
                return Err(err);
            }
        };

        state.player = Some(session.player().into());
        state.last = None;
        self.launch(&mut state, session);
        Ok(())
    }

    /// Runs the questions again for the same player.
    pub async fn play_again(&self) -> Result<(), ValidationError> {
        let mut state = self.inner.state.lock().await;
        let session = match state.last.take() {
            Some(mut session) => {
                session.restart();
                Ok(session)
            }
            None => match state.player.clone() {
                Some(player) => Session::new(&player, Arc::clone(&state.questions)),
                None => Err(ValidationError::EmptyPlayerName),
            },
        };

        match session {
            Ok(session) => {
                self.launch(&mut state, session);
                Ok(())
            }
            Err(err) => {
                state.view.alert(err.to_string());
                Err(err)
            }
        }
    }

    /// Discards the session and goes back to the login screen.
    pub async fn show_login(&self) {
        self.inner.state.lock().await.reset();
        self.load_leaderboard().await;
    }

    /// Forwards a button press to the running session. Returns `false` if
    /// there is no session to receive it.
    pub async fn select_answer(&self, question: usize, button: usize) -> bool {
        let state = self.inner.state.lock().await;
        state.run.as_ref().is_some_and(|run| run.events.send(Event { question, button }).is_ok())
    }

    /// Replaces any running session with a fresh task driving `session`.
    fn launch(&self, state: &mut State, session: Session) {
        state.discard_run();
        state.runs += 1;
        let id = state.runs;

        state.view.render_start(session.player());
        let (tx, rx) = mpsc::unbounded_channel();
        let game = self.clone();
        let handle = tokio::spawn(async move { game.run(id, session, rx).await });
        state.run = Some(Run { id, events: tx, handle });
        log::info!("run {id} started");
    }

    /// Applies `paint` only while run `id` is still the current one.
    async fn render(&self, id: u64, paint: impl FnOnce(&mut View)) -> bool {
        let mut state = self.inner.state.lock().await;
        if !state.is_current(id) {
            return false;
        }
        paint(&mut state.view);
        true
    }

    fn image_source(&self, prompt: &Prompt) -> Option<String> {
        let url = prompt.image.as_deref()?;
        Some(if self.inner.images.contains(url) { format!("/image/{}", prompt.index) } else { String::from(url) })
    }

    async fn run(&self, id: u64, mut session: Session, mut events: mpsc::UnboundedReceiver<Event>) {
        let mut rng = StdRng::from_entropy();
        let mut step = session.load_question(&mut rng);
        loop {
            let prompt = match step {
                Some(Step::Ask(prompt)) => prompt,
                Some(Step::Finished(score)) => return self.end_game(id, session, score).await,
                None => return,
            };

            let image = self.image_source(&prompt);
            if !self.render(id, |view| view.render_prompt(&prompt, image)).await {
                return;
            }

            let Some(verdict) = self.await_verdict(id, &mut session, &mut events).await else {
                return;
            };

            let time_left = session.time_left();
            if !self
                .render(id, |view| {
                    view.render_timer(time_left);
                    view.render_verdict(&verdict);
                })
                .await
            {
                return;
            }

            time::sleep(REVEAL_DELAY).await;

            // Presses made while the buttons were disabled are dropped.
            while events.try_recv().is_ok() {}
            step = session.advance(&mut rng);
        }
    }

    /// Counts down until the question is answered or the clock runs out.
    async fn await_verdict(
        &self,
        id: u64,
        session: &mut Session,
        events: &mut mpsc::UnboundedReceiver<Event>,
    ) -> Option<Verdict> {
        let mut ticker = time::interval_at(time::Instant::now() + SECOND, SECOND);
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Event { question, button } = event?;
                    if let Some(verdict) = session.answer(question, button) {
                        return Some(verdict);
                    }
                }
                _ = ticker.tick() => match session.tick() {
                    Tick::Running(left) => {
                        if !self.render(id, |view| view.render_timer(left)).await {
                            return None;
                        }
                    }
                    Tick::Expired(verdict) => return Some(verdict),
                    Tick::Ignored => return None,
                },
            }
        }
    }

    /// Saves the score once, then shows the results whether or not that worked.
    async fn end_game(&self, id: u64, session: Session, score: NewScore) {
        let result = gateway::bounded(self.inner.timeout, self.inner.gateway.insert_score(&score)).await;
        match result {
            Ok(()) => log::info!("saved score {} for {}", score.score, score.player_name),
            Err(err) => log::error!("failed to save score for {}: {err}", score.player_name),
        }

        let board = self.fetch_board(leaderboard::FINAL_SCORES, true).await;
        let mut state = self.inner.state.lock().await;
        if !state.is_current(id) {
            return;
        }

        state.run = None;
        if let Err(err) = result {
            state.view.alert(save_failure(err));
        }
        state.view.render_results(&score, session.correct(), session.total());
        state.view.set_board(ElementId::LeaderboardScores, board);
        state.last = Some(session);
    }
}

fn save_failure(err: GatewayError) -> String {
    format!("Your score could not be saved. {err}")
}
