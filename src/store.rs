//! Root composition of the three domains and the runtime that drives them.
//!
//! A single tokio task owns the state. Every action goes through the same
//! steps: reduce, publish a snapshot, run the orchestrator and execute its
//! effect, then resolve the caller's ticket if the action completes a
//! request. Requests of the same kind are take-latest: a newer request aborts
//! the older one and any result it still delivers is ignored.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use flume::{Receiver, Sender};
use futures_channel::oneshot;
use tokio::task::JoinHandle;

use crate::domains::auth::{AuthAction, AuthDomain, AuthOperation, AuthState};
use crate::domains::notification::{
    NotificationAction, NotificationDomain, NotificationOperation, NotificationState,
};
use crate::domains::plant::{PlantAction, PlantDomain, PlantOperation, PlantState};
use crate::effect::{Effect, RequestId};
use crate::environment::Environment;

/// One slice of the application: its actions, its state, a pure reducer
/// and an orchestrator for side effects.
pub trait Domain {
    type Action: Clone + std::fmt::Debug + Send + 'static;
    type State: Clone + Default;

    fn reduce(action: &Self::Action, state: &mut Self::State);

    fn orchestrate(action: &Self::Action, environment: &Environment) -> Effect<Self::Action>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub plant: PlantState,
    pub auth: AuthState,
    pub notification: NotificationState,
}

#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug)]
pub enum Action {
    Plant(PlantAction),
    Auth(AuthAction),
    Notification(NotificationAction),
}

impl From<PlantAction> for Action {
    fn from(value: PlantAction) -> Self {
        Action::Plant(value)
    }
}

impl From<AuthAction> for Action {
    fn from(value: AuthAction) -> Self {
        Action::Auth(value)
    }
}

impl From<NotificationAction> for Action {
    fn from(value: NotificationAction) -> Self {
        Action::Notification(value)
    }
}

/// A request kind. At most one request per kind is in flight.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Operation {
    Plant(PlantOperation),
    Auth(AuthOperation),
    Notification(NotificationOperation),
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Plant(op) => write!(f, "plant/{op}"),
            Operation::Auth(op) => write!(f, "auth/{op}"),
            Operation::Notification(op) => write!(f, "notification/{op}"),
        }
    }
}

impl Action {
    pub fn request(&self) -> Option<(Operation, RequestId)> {
        match self {
            Action::Plant(a) => a.request().map(|(op, id)| (Operation::Plant(op), id)),
            Action::Auth(a) => a.request().map(|(op, id)| (Operation::Auth(op), id)),
            Action::Notification(a) => a
                .request()
                .map(|(op, id)| (Operation::Notification(op), id)),
        }
    }

    pub fn completion(&self) -> Option<(Operation, RequestId, bool)> {
        match self {
            Action::Plant(a) => a
                .completion()
                .map(|(op, id, ok)| (Operation::Plant(op), id, ok)),
            Action::Auth(a) => a
                .completion()
                .map(|(op, id, ok)| (Operation::Auth(op), id, ok)),
            Action::Notification(a) => a
                .completion()
                .map(|(op, id, ok)| (Operation::Notification(op), id, ok)),
        }
    }

    fn ends_session(&self) -> bool {
        matches!(
            self,
            Action::Auth(AuthAction::Logout | AuthAction::SessionInvalidated)
        )
    }
}

pub fn reduce(action: &Action, state: &mut AppState) {
    match action {
        Action::Plant(a) => PlantDomain::reduce(a, &mut state.plant),
        Action::Auth(a) => {
            AuthDomain::reduce(a, &mut state.auth);
            if action.ends_session() {
                PlantDomain::reduce(&PlantAction::Reset, &mut state.plant);
                NotificationDomain::reduce(&NotificationAction::Reset, &mut state.notification);
            }
        }
        Action::Notification(a) => NotificationDomain::reduce(a, &mut state.notification),
    }
}

pub fn orchestrate(action: &Action, environment: &Environment) -> Effect<Action> {
    match action {
        Action::Plant(a) => PlantDomain::orchestrate(a, environment).map(Action::Plant),
        Action::Auth(a) => AuthDomain::orchestrate(a, environment).map(Action::Auth),
        Action::Notification(a) => {
            NotificationDomain::orchestrate(a, environment).map(Action::Notification)
        }
    }
}

/// Resolves once the request it was issued for has finished
#[derive(Debug)]
pub struct Ticket {
    id: RequestId,
    receiver: oneshot::Receiver<bool>,
}

impl Ticket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// `true` if the request succeeded. A failed, rejected or superseded
    /// request yields `false`.
    pub async fn outcome(self) -> bool {
        self.receiver.await.unwrap_or(false)
    }
}

enum Message {
    Dispatch(Action),
    Request(Action, oneshot::Sender<bool>),
}

type Subscribers = Arc<Mutex<Vec<Sender<AppState>>>>;

/// Handle to the running store. Cheap to clone; the event loop stops once
/// every handle is gone.
#[derive(Clone)]
pub struct Store {
    sender: Sender<Message>,
    snapshot: Arc<RwLock<AppState>>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Spawn the event loop. Must be called from within a tokio runtime.
    pub fn start(environment: Environment) -> Self {
        let (sender, receiver) = flume::unbounded();
        let snapshot = Arc::new(RwLock::new(AppState::default()));
        let subscribers = Subscribers::default();
        let runtime = Runtime::new(environment, snapshot.clone(), subscribers.clone());
        tokio::spawn(runtime.run(receiver));
        Self {
            sender,
            snapshot,
            subscribers,
        }
    }

    /// Fire and forget
    pub fn dispatch(&self, action: impl Into<Action>) {
        if self.sender.send(Message::Dispatch(action.into())).is_err() {
            log::error!("Store is not running, action dropped");
        }
    }

    /// Dispatch the request built by `make` and return a ticket for its
    /// outcome.
    pub fn request<A: Into<Action>>(&self, make: impl FnOnce(RequestId) -> A) -> Ticket {
        let id = RequestId::next();
        let (waiter, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::Request(make(id).into(), waiter))
            .is_err()
        {
            log::error!("Store is not running, request {id} dropped");
        }
        Ticket { id, receiver }
    }

    pub fn state(&self) -> AppState {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Receives a snapshot after every applied action
    pub fn subscribe(&self) -> Receiver<AppState> {
        let (sender, receiver) = flume::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sender);
        receiver
    }
}

struct InFlight {
    id: RequestId,
    task: Option<JoinHandle<()>>,
}

struct Runtime {
    environment: Environment,
    state: AppState,
    snapshot: Arc<RwLock<AppState>>,
    subscribers: Subscribers,
    in_flight: HashMap<Operation, InFlight>,
    superseded: HashSet<RequestId>,
    waiters: HashMap<RequestId, oneshot::Sender<bool>>,
    results: (Sender<Action>, Receiver<Action>),
    queue: VecDeque<Action>,
}

impl Runtime {
    fn new(environment: Environment, snapshot: Arc<RwLock<AppState>>, subscribers: Subscribers) -> Self {
        Self {
            environment,
            state: AppState::default(),
            snapshot,
            subscribers,
            in_flight: HashMap::new(),
            superseded: HashSet::new(),
            waiters: HashMap::new(),
            results: flume::unbounded(),
            queue: VecDeque::new(),
        }
    }

    async fn run(mut self, messages: Receiver<Message>) {
        let results = self.results.1.clone();
        let unauthorized = self.environment.unauthorized_signals();
        loop {
            tokio::select! {
                message = messages.recv_async() => match message {
                    Ok(Message::Dispatch(action)) => self.process(action),
                    Ok(Message::Request(action, waiter)) => {
                        match action.request() {
                            Some((_, id)) => {
                                self.waiters.insert(id, waiter);
                            }
                            None => log::warn!("Not a request action: {action:?}"),
                        }
                        self.process(action);
                    }
                    Err(_) => break,
                },
                Ok(action) = results.recv_async() => self.process(action),
                Ok(()) = unauthorized.recv_async() => {
                    if self.state.auth.session.is_authenticated() {
                        self.process(AuthAction::SessionInvalidated.into())
                    } else {
                        log::debug!("Ignoring 401 signal without a session");
                    }
                }
            }
        }
        self.cancel_all();
        log::debug!("Store stopped");
    }

    fn process(&mut self, action: Action) {
        self.queue.push_back(action);
        while let Some(action) = self.queue.pop_front() {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        if let Some((operation, id, _)) = action.completion() {
            if self.superseded.remove(&id) {
                log::debug!("Ignoring stale {operation} result {id}");
                return;
            }
        }
        log::trace!("{action:?}");

        let request = action.request();
        if let Some((operation, id)) = request {
            self.supersede(operation);
            self.in_flight.insert(operation, InFlight { id, task: None });
        }
        if action.ends_session() {
            self.cancel_all();
        }

        reduce(&action, &mut self.state);
        self.publish();

        let completion = action.completion();
        if let Some((operation, id, ok)) = completion {
            if self.in_flight.get(&operation).map(|f| f.id) == Some(id) {
                self.in_flight.remove(&operation);
            }
            if !ok {
                log::debug!("{operation} {id} failed");
            }
        }

        let (actions, futures) = orchestrate(&action, &self.environment).into_parts();
        for future in futures {
            let sender = self.results.0.clone();
            let task = tokio::spawn(async move {
                let action = future.await;
                let _ = sender.send(action);
            });
            // A request spawns at most one task
            if let Some((operation, id)) = request {
                if let Some(in_flight) = self.in_flight.get_mut(&operation) {
                    if in_flight.id == id {
                        in_flight.task = Some(task);
                    }
                }
            }
        }
        self.queue.extend(actions);

        // Resolved last so the caller observes the orchestrator's writes
        if let Some((_, id, ok)) = completion {
            if let Some(waiter) = self.waiters.remove(&id) {
                let _ = waiter.send(ok);
            }
        }
    }

    fn supersede(&mut self, operation: Operation) {
        let Some(previous) = self.in_flight.remove(&operation) else {
            return;
        };
        log::debug!("{operation} {} superseded", previous.id);
        self.abandon(previous);
    }

    fn cancel_all(&mut self) {
        let in_flight: Vec<_> = self.in_flight.drain().map(|(_, f)| f).collect();
        for previous in in_flight {
            self.abandon(previous);
        }
    }

    fn abandon(&mut self, previous: InFlight) {
        // Only a task that already ran to completion can have queued a result
        let finished = match previous.task {
            Some(task) => {
                let finished = task.is_finished();
                task.abort();
                finished
            }
            // Results of local failures are queued before the request returns
            None => true,
        };
        if finished {
            self.superseded.insert(previous.id);
        }
        // Dropping the waiter resolves its ticket with `false`
        self.waiters.remove(&previous.id);
    }

    fn publish(&self) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = self.state.clone();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|subscriber| subscriber.send(self.state.clone()).is_ok());
    }
}
