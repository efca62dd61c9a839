use clap::Args;
use roommate_match::config::AppConfig;
use roommate_match::error::AppError;
use roommate_match::roommates::{
    rank_candidates, score_pool, summarize, AnswerType, CandidateImporter, CompatibilityBand,
    CompatibilityScorer, MatchDistribution, MatchLimits, OwnerId, PageRequest, Questionnaire,
    RankRequest, RankedPage, ScoringConfig,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Candidate CSV export ("Candidate ID", "Created At", one column per question id)
    #[arg(long)]
    pub(crate) pool: PathBuf,
    /// Candidate id whose matches are ranked; their answers come from the export
    #[arg(long)]
    pub(crate) viewer: String,
    /// Minimum score to include (defaults to APP_MATCH_MIN_SCORE or 60)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) min_score: Option<u8>,
    /// One-based page number
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Page size (defaults to APP_MATCH_PAGE_SIZE or 20)
    #[arg(long)]
    pub(crate) size: Option<usize>,
}

/// Ranked page for one viewer plus the summary of everyone in the export.
#[derive(Debug)]
pub(crate) struct RankReport {
    pub(crate) viewer: OwnerId,
    pub(crate) viewer_answered: usize,
    pub(crate) page: RankedPage,
    pub(crate) distribution: MatchDistribution,
}

pub(crate) fn run_rank_report(args: RankArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let limits = config.matching.limits();
    let scoring = config.matching.scoring()?;

    let request = rank_request(&args, limits);
    let file = std::fs::File::open(&args.pool)?;
    let report = build_rank_report(file, OwnerId::new(args.viewer), request, scoring)?;

    render_rank_report(&report);
    Ok(())
}

fn rank_request(args: &RankArgs, limits: MatchLimits) -> RankRequest {
    RankRequest {
        min_score: args.min_score.unwrap_or(limits.min_score),
        page: PageRequest::new(
            args.page,
            args.size
                .unwrap_or(limits.page_size)
                .clamp(1, limits.max_page_size.max(1)),
        ),
    }
}

pub(crate) fn build_rank_report<R: Read>(
    reader: R,
    viewer: OwnerId,
    request: RankRequest,
    scoring: ScoringConfig,
) -> Result<RankReport, AppError> {
    let questionnaire = Questionnaire::standard();
    scoring.validate(&questionnaire)?;
    let scorer = CompatibilityScorer::new(scoring);

    let mut candidates = CandidateImporter::from_reader(reader, &questionnaire)?;
    let position = candidates
        .iter()
        .position(|candidate| candidate.id == viewer)
        .ok_or_else(|| AppError::UnknownViewer(viewer.to_string()))?;
    let viewer_record = candidates.remove(position).preference_record;

    let results = score_pool(&scorer, &viewer, viewer_record.as_ref(), &candidates);
    let distribution = summarize(&results, scorer.factors());
    let page = rank_candidates(&scorer, &viewer, viewer_record.as_ref(), candidates, request);

    Ok(RankReport {
        viewer_answered: viewer_record
            .as_ref()
            .map(|record| record.answers().len())
            .unwrap_or_default(),
        viewer,
        page,
        distribution,
    })
}

fn render_rank_report(report: &RankReport) {
    let RankReport {
        viewer,
        viewer_answered,
        page,
        distribution,
    } = report;

    println!("Roommate matches for {viewer}");
    if *viewer_answered == 0 {
        println!("- {viewer} has not answered the questionnaire; every score is neutral");
    } else {
        println!("- {viewer_answered} questions answered");
    }
    println!(
        "- {} matches | page {} of {} ({} per page)",
        page.total_matches,
        page.page,
        page.total_pages.max(1),
        page.size
    );

    if page.is_empty() {
        println!("  No candidates on this page meet the threshold.");
    }
    for (offset, item) in page.items.iter().enumerate() {
        let rank = (page.page.max(1) - 1) * page.size + offset + 1;
        println!(
            "  {rank:>3}. {:<20} {:>3} ({})",
            item.candidate.id.as_str(),
            item.result.score,
            item.result.band.label()
        );
    }

    println!("\nPool summary ({} candidates)", distribution.total_count);
    println!("- Average score {}", distribution.average_score);
    for band in CompatibilityBand::ordered() {
        println!("  - {:<9} {}", band.label(), distribution.band_count(band));
    }
    if !distribution.top_factors.is_empty() {
        println!("Top factors:");
        for factor in &distribution.top_factors {
            println!(
                "  - {}: {:.1}% average compatibility",
                factor.factor_id, factor.average_contribution_percent
            );
        }
    }

    let insights = distribution.insights();
    println!("Insights:");
    for observation in &insights.observations {
        println!("  - {observation}");
    }
}

pub(crate) fn print_questionnaire() {
    let questionnaire = Questionnaire::standard();
    println!("Roommate questionnaire ({} questions)", questionnaire.len());
    for (index, question) in questionnaire.questions().iter().enumerate() {
        println!(
            "{:>2}. [{}] {} ({})",
            index + 1,
            question.id,
            question.prompt,
            question.answer_type.label()
        );
        if question.answer_type != AnswerType::Scale {
            let options: Vec<&str> = question
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect();
            println!("    options: {}", options.join(", "));
        }
    }
}
