use crate::core::candidate::{CandidateCache, RenderId};
use crate::core::options::FilterOptions;
use crate::core::search::ranker::{ScoredCandidate, rank};
use crate::core::search::scorer::{fold_case, score_candidate};
use crate::runtime::effect::Effect;
use crate::runtime::event::FilterEvent;
use crate::state::navigation::{Direction, NavigationState};
use crate::ui::placement::{self, Layout, Viewport};
use std::collections::HashSet;
use tracing::debug;

/// Per-instance filtering state: the candidate cache, the current input,
/// what the popup shows and which row has keyboard focus.
#[derive(Debug)]
pub struct FilterSession {
    options: FilterOptions,
    cache: CandidateCache,
    input: String,
    shown: bool,
    visible: Vec<RenderId>,
    nav: NavigationState,
    layout: Option<Layout>,
}

impl FilterSession {
    pub fn new(options: FilterOptions) -> Self {
        let cache = options.build_cache();
        Self {
            options,
            cache,
            input: String::new(),
            shown: false,
            visible: Vec::new(),
            nav: NavigationState::new(),
            layout: None,
        }
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn cache(&self) -> &CandidateCache {
        &self.cache
    }

    /// With no candidates the instance stays attached but never filters.
    pub fn is_inert(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn input(&self) -> &str {
        self.input.as_str()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn visible(&self) -> &[RenderId] {
        self.visible.as_slice()
    }

    pub fn visible_texts(&self) -> Vec<&str> {
        self.visible
            .iter()
            .filter_map(|id| self.cache.get(*id))
            .map(|candidate| candidate.text())
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.nav.cursor()
    }

    pub fn active(&self) -> Option<RenderId> {
        let offset = self.nav.active_offset()?;
        self.visible.get(offset).copied()
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn input_is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Scores the whole cache against the current input and updates the
    /// popup.
    pub fn run_filter(&mut self) -> Vec<Effect> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            if self.options.show_all {
                return Vec::new();
            }
            return self.hide_popup();
        }

        let case_sensitive = self.options.case_sensitive;
        let query = fold_case(trimmed, case_sensitive).into_owned();
        let strategy = self.options.strategy();

        let scored: Vec<ScoredCandidate<'_>> = self
            .cache
            .iter()
            .filter_map(|candidate| {
                let score = score_candidate(
                    strategy,
                    &self.options.fuzzy_scorer,
                    candidate.text(),
                    &query,
                    case_sensitive,
                );
                (score > 0.0).then(|| ScoredCandidate::new(score, candidate))
            })
            .collect();
        let matched = scored.len();

        let ranked = rank(
            scored,
            self.options.sort_by,
            self.options.max_list_entries,
            self.options.post_filter.as_ref(),
            &query,
        );

        let next: Vec<RenderId> = ranked
            .visible
            .iter()
            .map(|entry| entry.candidate.render_id())
            .collect();
        let truncated: Vec<RenderId> = ranked
            .truncated
            .iter()
            .map(|entry| entry.candidate.render_id())
            .collect();
        let exact_match = match ranked.visible.as_slice() {
            [only] => only.text().to_lowercase() == self.input.to_lowercase(),
            _ => false,
        };

        debug!(
            query = %query,
            matched,
            visible = next.len(),
            exact_match,
            "filter pass"
        );

        if next.is_empty() {
            return self.hide_popup();
        }

        let mut effects = Vec::new();
        let keep: HashSet<RenderId> = next.iter().copied().collect();
        let mut hidden: HashSet<RenderId> = HashSet::new();
        let mut to_hide: Vec<RenderId> = self
            .visible
            .iter()
            .copied()
            .filter(|id| !keep.contains(id) && hidden.insert(*id))
            .collect();
        to_hide.extend(truncated.into_iter().filter(|id| hidden.insert(*id)));
        if !to_hide.is_empty() {
            effects.push(Effect::HideItems(to_hide));
        }

        if exact_match {
            effects.extend(self.hide_popup());
            return effects;
        }

        effects.extend(self.present(next));
        effects
    }

    /// Reveals every cached candidate without scoring.
    pub fn show_all(&mut self) -> Vec<Effect> {
        if self.cache.is_empty() {
            return Vec::new();
        }
        debug!(count = self.cache.len(), "showing all candidates");
        let all = self.cache.render_ids().collect();
        self.present(all)
    }

    pub fn hide_popup(&mut self) -> Vec<Effect> {
        self.shown = false;
        self.visible.clear();
        self.nav.reset();
        vec![Effect::HidePopup]
    }

    pub fn navigate(&mut self, direction: Direction) -> Vec<Effect> {
        let cursor = self.nav.step(direction, self.visible.len());
        debug!(?direction, cursor, "navigate");
        vec![Effect::SetActive(self.active())]
    }

    pub fn confirm(&mut self) -> Vec<Effect> {
        match self.nav.active_offset() {
            Some(offset) => self.select(offset),
            None => Vec::new(),
        }
    }

    /// Pointer selection: focus the clicked row, then confirm it.
    pub fn click(&mut self, offset: usize) -> Vec<Effect> {
        if !self.shown || !self.nav.focus_offset(offset, self.visible.len()) {
            return Vec::new();
        }
        self.confirm()
    }

    pub fn set_layout(&mut self, layout: Layout) -> Vec<Effect> {
        self.layout = Some(layout);
        self.reposition().into_iter().collect()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<Effect> {
        let Some(layout) = self.layout.as_mut() else {
            return Vec::new();
        };
        layout.viewport = viewport;
        self.reposition().into_iter().collect()
    }

    pub fn reposition(&self) -> Option<Effect> {
        if !self.shown {
            return None;
        }
        let layout = self.layout.as_ref()?;
        Some(Effect::Reposition(placement::resolve(
            self.options.position,
            layout,
            self.visible.len(),
        )))
    }

    /// Commits the visible item at `offset` into the input.
    pub fn select(&mut self, offset: usize) -> Vec<Effect> {
        let Some(text) = self
            .visible
            .get(offset)
            .and_then(|id| self.cache.get(*id))
            .map(|candidate| candidate.text().to_string())
        else {
            return Vec::new();
        };

        debug!(selected = %text, "selection");
        self.input = text.clone();
        let mut effects = vec![
            Effect::SetInputValue(text.clone()),
            Effect::Emit(FilterEvent::Selected { selected: text }),
        ];
        effects.extend(self.hide_popup());
        effects.push(Effect::FocusInput);
        effects.push(Effect::PreventDefault);
        effects
    }

    fn present(&mut self, next: Vec<RenderId>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.shown {
            self.shown = true;
            effects.push(Effect::ShowPopup);
        }
        effects.push(Effect::ShowItems(next.clone()));
        self.visible = next;
        self.nav.clamp(self.visible.len());
        effects.push(Effect::SetActive(self.active()));
        effects.extend(self.reposition());
        effects
    }
}
