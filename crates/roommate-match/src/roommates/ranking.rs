use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::preferences::{OwnerId, PreferenceRecord};
use super::scoring::{CompatibilityResult, CompatibilityScorer, Participant};

pub const DEFAULT_MIN_SCORE: u8 = 60;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Pool member supplied by the candidate source. Answers stay private to scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: OwnerId,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub preference_record: Option<PreferenceRecord>,
}

impl Candidate {
    pub fn new(
        id: OwnerId,
        created_at: DateTime<Utc>,
        preference_record: Option<PreferenceRecord>,
    ) -> Self {
        Self {
            id,
            created_at,
            preference_record,
        }
    }
}

/// One-based page request. Page `0` is read as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRequest {
    pub min_score: u8,
    pub page: PageRequest,
}

impl Default for RankRequest {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            page: PageRequest::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub result: CompatibilityResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPage {
    pub items: Vec<RankedCandidate>,
    pub page: usize,
    pub size: usize,
    pub total_matches: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl RankedPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Score every candidate against the viewer. Runs on the rayon pool; order follows the input.
pub fn score_pool(
    scorer: &CompatibilityScorer,
    viewer_id: &OwnerId,
    viewer: Option<&PreferenceRecord>,
    candidates: &[Candidate],
) -> Vec<CompatibilityResult> {
    candidates
        .par_iter()
        .map(|candidate| {
            scorer.score(
                Participant::new(viewer_id, viewer),
                Participant::new(&candidate.id, candidate.preference_record.as_ref()),
            )
        })
        .collect()
}

/// Score, filter by `min_score`, sort, and cut the requested page.
///
/// Ordering is score descending, then newest `created_at`, then candidate id, so
/// identical inputs always produce the identical page.
pub fn rank_candidates(
    scorer: &CompatibilityScorer,
    viewer_id: &OwnerId,
    viewer: Option<&PreferenceRecord>,
    candidates: Vec<Candidate>,
    request: RankRequest,
) -> RankedPage {
    let results = score_pool(scorer, viewer_id, viewer, &candidates);

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .zip(results)
        .filter(|(_, result)| result.score >= request.min_score)
        .map(|(candidate, result)| RankedCandidate { candidate, result })
        .collect();

    ranked.sort_by(compare_ranked);

    paginate(ranked, request.page)
}

fn compare_ranked(left: &RankedCandidate, right: &RankedCandidate) -> Ordering {
    right
        .result
        .score
        .cmp(&left.result.score)
        .then_with(|| right.candidate.created_at.cmp(&left.candidate.created_at))
        .then_with(|| left.candidate.id.cmp(&right.candidate.id))
}

fn paginate(ranked: Vec<RankedCandidate>, request: PageRequest) -> RankedPage {
    let total_matches = ranked.len();
    let page = request.page.max(1);
    let total_pages = if request.size == 0 {
        0
    } else {
        total_matches.div_ceil(request.size)
    };
    let offset = request.offset();

    let items: Vec<RankedCandidate> = ranked
        .into_iter()
        .skip(offset)
        .take(request.size)
        .collect();
    let has_more = request.size > 0 && offset.saturating_add(items.len()) < total_matches;

    RankedPage {
        items,
        page,
        size: request.size,
        total_matches,
        total_pages,
        has_more,
    }
}
