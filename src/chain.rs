//! Middleware chains.
//!
//! A [`Chain`] is an immutable list of [`Constructor`]s. [`Chain::then`]
//! folds them right-to-left around a terminal handler, so the *first*
//! constructor ends up *outermost*:
//!
//! ```text
//! Chain::new([a, b, c]).then(h)   ==   a(b(c(h)))
//!
//! request ──► a ──► b ──► c ──► h
//! ```
//!
//! Declaration order is execution order. A logging middleware declared first
//! sees the whole request, including the time spent in `b`, `c` and `h`.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, Terminal, handler_fn};
use crate::request::Request;
use crate::response::ResponseWriter;

/// A piece of middleware: takes the next handler, returns one wrapping it.
pub type Constructor = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>;

/// Builds a [`Constructor`] from a closure returning any [`Handler`].
///
/// ```rust
/// use synapse::{Handler, constructor, handler_fn};
///
/// let noop = constructor(|next| {
///     handler_fn(move |cx, w, req| next.serve_ctx(cx, w, req))
/// });
/// ```
pub fn constructor<F, H>(f: F) -> Constructor
where
    F: Fn(BoxedHandler) -> H + Send + Sync + 'static,
    H: Handler,
{
    Arc::new(move |next| f(next).into_boxed_handler())
}

/// An immutable, ordered list of middleware constructors.
///
/// Chains are plain values. [`append`](Chain::append) and
/// [`extend`](Chain::extend) return new chains in freshly allocated storage
/// and never touch the receiver, and [`then`](Chain::then) only reads it, so
/// a chain can be shared and reused freely.
#[derive(Default)]
pub struct Chain {
    constructors: Vec<Constructor>,
}

impl Chain {
    /// Creates a chain holding `constructors` in the given order.
    ///
    /// An empty list is a valid, identity chain.
    pub fn new<I>(constructors: I) -> Self
    where
        I: IntoIterator<Item = Constructor>,
    {
        Self { constructors: constructors.into_iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Wraps `handler` in every constructor and returns the composed handler.
    ///
    /// Constructors run on *every* call, so reusing a chain for several
    /// terminals builds several independent middleware instances. State a
    /// constructor captured when it was created (a shared log sink, say) is
    /// shared by all of them.
    ///
    /// # Panics
    ///
    /// Panics if `handler` is `None`. The chain itself is left as it was.
    pub fn then(&self, handler: impl Terminal) -> BoxedHandler {
        let Some(terminal) = handler.into_terminal() else {
            panic!("chain terminal handler is absent");
        };

        trace!(constructors = self.constructors.len(), "composing handler chain");

        self.constructors
            .iter()
            .rev()
            .fold(terminal, |next, construct| construct(next))
    }

    /// Like [`then`](Chain::then), for a terminal written as a plain closure.
    pub fn then_func<F>(&self, f: F) -> BoxedHandler
    where
        F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
    {
        self.then(handler_fn(f))
    }

    /// Returns a new chain: this chain's constructors followed by
    /// `constructors`.
    pub fn append<I>(&self, constructors: I) -> Chain
    where
        I: IntoIterator<Item = Constructor>,
    {
        let constructors = constructors.into_iter();
        let mut combined = Vec::with_capacity(self.constructors.len() + constructors.size_hint().0);
        combined.extend(self.constructors.iter().cloned());
        combined.extend(constructors);
        Chain { constructors: combined }
    }

    /// Returns a new chain: this chain's constructors followed by `other`'s.
    pub fn extend(&self, other: &Chain) -> Chain {
        self.append(other.constructors.iter().cloned())
    }
}

/// Copies into new storage; the two chains never share a backing vector.
impl Clone for Chain {
    fn clone(&self) -> Self {
        Self::new(self.constructors.iter().cloned())
    }
}

impl FromIterator<Constructor> for Chain {
    fn from_iter<I: IntoIterator<Item = Constructor>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.constructors.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handler::HandlerFn;

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, name: &'static str) -> Constructor {
        let log = Arc::clone(log);
        constructor(move |next| {
            let log = Arc::clone(&log);
            handler_fn(move |cx, w, req| {
                log.lock().unwrap().push(format!("{name}:before"));
                next.serve_ctx(cx, w, req);
                log.lock().unwrap().push(format!("{name}:after"));
            })
        })
    }

    fn terminal(log: &Log) -> BoxedHandler {
        let log = Arc::clone(log);
        handler_fn(move |_cx, w, _req| {
            log.lock().unwrap().push("handler".to_owned());
            let _ = w.write_all(b"done");
        })
        .into_boxed_handler()
    }

    #[test]
    fn new_keeps_order() {
        let log = Log::default();
        let a = record(&log, "a");
        let b = record(&log, "b");

        let chain = Chain::new([Arc::clone(&a), Arc::clone(&b)]);

        assert_eq!(chain.len(), 2);
        assert!(Arc::ptr_eq(&chain.constructors[0], &a));
        assert!(Arc::ptr_eq(&chain.constructors[1], &b));
    }

    #[test]
    fn first_constructor_is_outermost() {
        let log = Log::default();
        let h = Chain::new([record(&log, "a"), record(&log, "b")]).then(terminal(&log));

        h.serve(&mut ResponseWriter::new(), &Request::default());

        assert_eq!(
            *log.lock().unwrap(),
            ["a:before", "b:before", "handler", "b:after", "a:after"],
        );
    }

    #[test]
    fn empty_chain_returns_terminal_itself() {
        let log = Log::default();
        let h = terminal(&log);
        let composed = Chain::default().then(Arc::clone(&h));
        assert!(Arc::ptr_eq(&h, &composed));
    }

    #[test]
    #[should_panic(expected = "chain terminal handler is absent")]
    fn then_panics_on_absent_handler() {
        Chain::default().then(None::<BoxedHandler>);
    }

    #[test]
    #[should_panic(expected = "chain terminal handler is absent")]
    fn then_panics_on_absent_function() {
        let log = Log::default();
        Chain::new([record(&log, "a")])
            .then(None::<HandlerFn<fn(Context, &mut ResponseWriter, &Request)>>);
    }

    #[test]
    fn then_reruns_constructors() {
        let built = Arc::new(AtomicUsize::new(0));
        let counting = {
            let built = Arc::clone(&built);
            constructor(move |next| {
                built.fetch_add(1, Ordering::SeqCst);
                next
            })
        };
        let chain = Chain::new([counting]);
        let log = Log::default();

        let first = chain.then(terminal(&log));
        let second = chain.then(terminal(&log));

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn append_does_not_touch_receiver() {
        let log = Log::default();
        let chain = Chain::new([record(&log, "a")]);
        let longer = chain.append([record(&log, "b"), record(&log, "c")]);

        assert_eq!(chain.len(), 1);
        assert_eq!(longer.len(), 3);
        assert_ne!(chain.constructors.as_ptr(), longer.constructors.as_ptr());
        assert!(Arc::ptr_eq(&chain.constructors[0], &longer.constructors[0]));
    }

    #[test]
    fn extend_matches_append() {
        let log = Log::default();
        let c1 = Chain::new([record(&log, "a")]);
        let c2 = Chain::new([record(&log, "b"), record(&log, "c")]);

        let extended = c1.extend(&c2);
        let appended = c1.append(c2.constructors.iter().cloned());

        assert_eq!((c1.len(), c2.len()), (1, 2));
        assert_eq!(extended.len(), appended.len());
        for (x, y) in extended.constructors.iter().zip(&appended.constructors) {
            assert!(Arc::ptr_eq(x, y));
        }
        assert_ne!(extended.constructors.as_ptr(), c1.constructors.as_ptr());
        assert_ne!(extended.constructors.as_ptr(), c2.constructors.as_ptr());
    }

    #[test]
    fn clone_allocates_new_storage() {
        let log = Log::default();
        let chain = Chain::new([record(&log, "a")]);
        let copy = chain.clone();
        assert_ne!(chain.constructors.as_ptr(), copy.constructors.as_ptr());
    }
}
