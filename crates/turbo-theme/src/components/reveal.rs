//! Scroll-reveal animation for `[data-reveal]` elements.

use std::rc::Rc;

use turbo_theme_core::dom::{markup, Document, IntersectionOptions, ObserveAction, Selector};

use crate::{ThemeContext, ThemeError};

/// Adds the reveal class to each flagged element the first time it scrolls
/// into view, then stops watching it.
#[derive(Debug)]
pub struct RevealAnimation {
    observed: usize,
}

impl RevealAnimation {
    /// Start observing. Fails when the page disables animations or flags no
    /// elements.
    pub fn mount(ctx: &ThemeContext) -> Result<Self, ThemeError> {
        if !animations_enabled(ctx.document.as_ref()) {
            return Err(ThemeError::Disabled("animations"));
        }

        let targets = ctx
            .document
            .query_all(&Selector::attribute(markup::REVEAL_ATTR));
        if targets.is_empty() {
            return Err(ThemeError::MissingElement("[data-reveal]"));
        }

        let reveal = &ctx.config.reveal;
        let options = IntersectionOptions {
            threshold: reveal.threshold,
            root_margin: reveal.root_margin.clone(),
        };
        let class = reveal.class.clone();
        ctx.document.observe_intersection(
            &targets,
            &options,
            Rc::new(move |element| {
                element.add_class(&class);
                ObserveAction::Unobserve
            }),
        );

        ctx.logger_for("reveal")
            .debug_builder("observing")
            .field_i64("elements", targets.len() as i64)
            .emit();

        Ok(Self {
            observed: targets.len(),
        })
    }

    pub fn from_context(ctx: &ThemeContext) -> Option<Self> {
        Self::mount(ctx).ok()
    }

    /// Number of elements handed to the observer.
    pub fn observed(&self) -> usize {
        self.observed
    }
}

/// Animations run unless the body says `data-animations-enabled="false"`.
pub fn animations_enabled(document: &dyn Document) -> bool {
    document
        .body()
        .and_then(|body| body.attribute(markup::ANIMATIONS_ENABLED_ATTR))
        .as_deref()
        != Some("false")
}
