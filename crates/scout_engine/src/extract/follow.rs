use scout_core::{Cascade, ExtractionResult, StrategyError};

use crate::page::{element_text, DomSnapshot, Locator, TextMatch};

/// A follow control found on the page: how to click it and the label of the
/// element the click will land on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowTarget {
    pub locator: Locator,
    pub label: String,
}

/// Decides whether a company page is already followed and where to click
/// otherwise. Swappable so other page languages or layouts can be supported.
pub trait FollowDetector: Send + Sync {
    fn already_following(&self, snapshot: &DomSnapshot) -> bool;
    fn follow_button(&self, snapshot: &DomSnapshot) -> ExtractionResult<FollowTarget>;
}

/// Detection by button labels. The "already following" check runs before
/// any follow locator so a `Following` button is never mistaken for `Follow`.
#[derive(Debug)]
pub struct ButtonTextDetector {
    following_labels: Vec<String>,
    cascade: Cascade<DomSnapshot, FollowTarget>,
}

impl ButtonTextDetector {
    pub fn new(follow_labels: &[&str], following_labels: &[&str]) -> Self {
        let following: Vec<String> = following_labels.iter().map(|l| l.to_string()).collect();
        Self {
            cascade: follow_button_cascade(follow_labels, &following),
            following_labels: following,
        }
    }
}

impl Default for ButtonTextDetector {
    fn default() -> Self {
        Self::new(&["Follow", "+ Follow"], &["Following", "Unfollow"])
    }
}

impl FollowDetector for ButtonTextDetector {
    fn already_following(&self, snapshot: &DomSnapshot) -> bool {
        self.following_labels.iter().any(|label| {
            let locator = Locator::CssText {
                css: "button".to_string(),
                text: TextMatch::Exact(label.clone()),
            };
            matches!(snapshot.count(&locator), Ok(n) if n > 0)
        })
    }

    fn follow_button(&self, snapshot: &DomSnapshot) -> ExtractionResult<FollowTarget> {
        self.cascade.extract(snapshot)
    }
}

/// Exact button labels first, then attribute-based controls. A candidate is
/// valid only if the first element it would click is not labelled as an
/// unfollow control.
pub fn follow_button_cascade(follow_labels: &[&str], following_labels: &[String]) -> Cascade<DomSnapshot, FollowTarget> {
    let rejected: Vec<String> = following_labels.iter().map(|l| l.to_lowercase()).collect();
    let labels: Vec<String> = follow_labels.iter().map(|l| l.to_string()).collect();

    Cascade::new("follow button", move |target: &FollowTarget| {
        let label = target.label.to_lowercase();
        !rejected.iter().any(|r| label.contains(r.as_str()))
    })
    .strategy("button label", move |snap: &DomSnapshot| {
        for label in &labels {
            let found = first_target(snap, Locator::css_exact("button", label.as_str()))?;
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    })
    .strategy("aria label", |snap: &DomSnapshot| {
        first_target(
            snap,
            Locator::css("button[aria-label*=\"Follow\"]:not([aria-label*=\"Following\"]):not([aria-label*=\"Unfollow\"])"),
        )
    })
    .strategy("follow control", |snap: &DomSnapshot| {
        first_target(snap, Locator::css("button[data-control-name=\"follow\"]"))
    })
}

fn first_target(snap: &DomSnapshot, locator: Locator) -> Result<Option<FollowTarget>, StrategyError> {
    let first = snap.find(&locator)?.into_iter().next();
    Ok(first.map(|el| FollowTarget {
        label: el
            .value()
            .attr("aria-label")
            .map(str::to_string)
            .unwrap_or_else(|| element_text(el)),
        locator,
    }))
}
