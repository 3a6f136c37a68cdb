use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Correlates a request action with the result action that completes it
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an orchestrator wants to happen after an action was reduced.
pub enum Effect<A> {
    None,
    /// Dispatch this action right away
    Action(A),
    /// Run this on the runtime and dispatch its output
    Future(BoxFuture<'static, A>),
    Merge(Vec<Effect<A>>),
}

impl<A> std::fmt::Debug for Effect<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Action(a) => f.debug_tuple("Effect::Action").field(a).finish(),
            Effect::Future(_) => write!(f, "Effect::Future"),
            Effect::Merge(effects) => f.debug_list().entries(effects).finish(),
        }
    }
}

impl<A: Send + 'static> Effect<A> {
    pub const NONE: Self = Effect::None;

    pub fn action(action: A) -> Self {
        Effect::Action(action)
    }

    pub fn future<T, F, M>(future: F, mapper: M) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        M: FnOnce(T) -> A + Send + 'static,
    {
        Effect::Future(future.map(mapper).boxed())
    }

    pub fn merge2(a: Effect<A>, b: Effect<A>) -> Self {
        Effect::Merge(vec![a, b])
    }

    pub fn is_none(&self) -> bool {
        match self {
            Effect::None => true,
            Effect::Merge(effects) => effects.iter().all(Effect::is_none),
            _ => false,
        }
    }

    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B: Send + 'static>(
        self,
        f: Arc<dyn Fn(A) -> B + Send + Sync>,
    ) -> Effect<B> {
        match self {
            Effect::None => Effect::None,
            Effect::Action(a) => Effect::Action(f(a)),
            Effect::Future(future) => Effect::Future(future.map(move |a| f(a)).boxed()),
            Effect::Merge(effects) => Effect::Merge(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(f.clone()))
                    .collect(),
            ),
        }
    }

    /// Immediate actions and futures, in order
    pub fn into_parts(self) -> (Vec<A>, Vec<BoxFuture<'static, A>>) {
        let mut actions = Vec::new();
        let mut futures = Vec::new();
        self.collect_into(&mut actions, &mut futures);
        (actions, futures)
    }

    fn collect_into(self, actions: &mut Vec<A>, futures: &mut Vec<BoxFuture<'static, A>>) {
        match self {
            Effect::None => {}
            Effect::Action(a) => actions.push(a),
            Effect::Future(f) => futures.push(f),
            Effect::Merge(effects) => {
                for effect in effects {
                    effect.collect_into(actions, futures);
                }
            }
        }
    }
}
