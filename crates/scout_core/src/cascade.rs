//! Ordered fallback chains for resolving one value from an unstable page.
//!
//! Strategies run from most to least precise. The first value that passes the
//! goal's validity predicate wins; later strategies are never invoked. A
//! strategy that errors counts as a miss and the chain moves on.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StrategyError(pub String);

impl StrategyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult<T> {
    Found { value: T, strategy: &'static str },
    NotFound,
}

impl<T> ExtractionResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionResult::Found { .. })
    }

    pub fn strategy(&self) -> Option<&'static str> {
        match self {
            ExtractionResult::Found { strategy, .. } => Some(*strategy),
            ExtractionResult::NotFound => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ExtractionResult::Found { value, .. } => Some(value),
            ExtractionResult::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionResult<U> {
        match self {
            ExtractionResult::Found { value, strategy } => ExtractionResult::Found {
                value: f(value),
                strategy,
            },
            ExtractionResult::NotFound => ExtractionResult::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    /// The strategy had nothing to offer.
    Empty,
    /// A value was produced but failed the validity predicate.
    Rejected,
    Failed(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Accepted => write!(f, "accepted"),
            AttemptOutcome::Empty => write!(f, "empty"),
            AttemptOutcome::Rejected => write!(f, "rejected"),
            AttemptOutcome::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: &'static str,
    pub outcome: AttemptOutcome,
}

type StrategyFn<P, T> = Box<dyn Fn(&P) -> Result<Option<T>, StrategyError> + Send + Sync>;
type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Strategy<P: ?Sized, T> {
    name: &'static str,
    run: StrategyFn<P, T>,
}

pub struct Cascade<P: ?Sized, T> {
    goal: &'static str,
    strategies: Vec<Strategy<P, T>>,
    is_valid: Predicate<T>,
}

impl<P: ?Sized, T> Cascade<P, T> {
    pub fn new(goal: &'static str, is_valid: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            goal,
            strategies: Vec::new(),
            is_valid: Box::new(is_valid),
        }
    }

    /// Appends a strategy; it runs after every strategy added before it.
    pub fn strategy(
        mut self,
        name: &'static str,
        run: impl Fn(&P) -> Result<Option<T>, StrategyError> + Send + Sync + 'static,
    ) -> Self {
        self.strategies.push(Strategy {
            name,
            run: Box::new(run),
        });
        self
    }

    pub fn goal(&self) -> &'static str {
        self.goal
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    pub fn extract(&self, page: &P) -> ExtractionResult<T> {
        self.extract_traced(page).0
    }

    /// Like [`Cascade::extract`], also reporting what each invoked strategy did.
    pub fn extract_traced(&self, page: &P) -> (ExtractionResult<T>, Vec<Attempt>) {
        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let outcome = match (strategy.run)(page) {
                Ok(Some(value)) if (self.is_valid)(&value) => {
                    attempts.push(Attempt {
                        strategy: strategy.name,
                        outcome: AttemptOutcome::Accepted,
                    });
                    return (
                        ExtractionResult::Found {
                            value,
                            strategy: strategy.name,
                        },
                        attempts,
                    );
                }
                Ok(Some(_)) => AttemptOutcome::Rejected,
                Ok(None) => AttemptOutcome::Empty,
                Err(err) => AttemptOutcome::Failed(err.0),
            };
            attempts.push(Attempt {
                strategy: strategy.name,
                outcome,
            });
        }
        (ExtractionResult::NotFound, attempts)
    }
}

impl<P: ?Sized, T> fmt::Debug for Cascade<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cascade")
            .field("goal", &self.goal)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
