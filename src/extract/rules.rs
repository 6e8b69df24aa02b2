//! Static extraction tables, one per declared domain.
//!
//! Output columns are relative to the domain prefix; [`RuleSet::apply_rules`]
//! prepends `<domain>.`.

use crate::domain::Domain;
use crate::extract::{
    CategoricalTable, ChildField, Derivation, KeyFilter, Rule, RuleSet,
};

const fn f(key: &'static str) -> ChildField {
    ChildField::same(key)
}

/// Congruence judgment labels of the four-sides model.
pub static CONGRUENCE_LEVELS: CategoricalTable = CategoricalTable {
    name: "congruence_level",
    levels: &[
        ("congruent", 3),
        ("largely congruent", 3),
        ("high", 3),
        ("hoog", 3),
        ("congruent (hoog)", 3),
        ("partially congruent", 2),
        ("partly congruent", 2),
        ("mixed", 2),
        ("moderate", 2),
        ("gemiddeld", 2),
        ("gedeeltelijk congruent", 2),
        ("incongruent", 1),
        ("low", 1),
        ("laag", 1),
    ],
};

/// Narrative coherence levels.
pub static COHERENCE_LEVELS: CategoricalTable = CategoricalTable {
    name: "coherence_level",
    levels: &[
        ("hoog", 3),
        ("high", 3),
        ("midden", 2),
        ("gemiddeld", 2),
        ("medium", 2),
        ("moderate", 2),
        ("laag", 1),
        ("low", 1),
    ],
};

// aristoteles

const MODE: &[ChildField] = &[
    f("score"),
    f("analysis"),
    f("quotes"),
    f("strengths"),
    f("improvement_points"),
    f("specific_diagnosis"),
];

const PATHOS: &[ChildField] = &[
    f("score"),
    f("analysis"),
    f("quotes"),
    f("strengths"),
    f("improvement_points"),
    f("specific_diagnosis"),
    f("emotional_tone"),
];

const ETHOS: &[ChildField] = &[
    f("score"),
    f("analysis"),
    f("quotes"),
    f("strengths"),
    f("improvement_points"),
    f("specific_diagnosis"),
    f("authenticity"),
];

const SCORE_ANALYSIS: &[ChildField] = &[f("score"), f("analysis")];

const SCORE_ANALYSIS_QUOTES: &[ChildField] = &[f("score"), f("analysis"), f("quotes")];

const BALANCE: &[ChildField] = &[
    f("dominant_mode"),
    f("suppressed_mode"),
    f("balance_score"),
    f("analysis"),
    f("consequences_of_imbalance"),
    f("recommendation_for_balance"),
];

const ARISTOTELES_OVERALL: &[ChildField] = &[
    f("overall_rhetorical_score"),
    f("summary"),
    f("strengths_top_3"),
    f("improvement_points_top_3"),
    f("primary_rhetorical_style"),
    f("audience_analysis"),
    f("recommendations_for_next_sermon"),
    f("conclusion"),
];

static ARISTOTELES: RuleSet = RuleSet {
    domain: Domain::Aristoteles,
    rules: &[
        Rule::optional("aristotelian_modes_analysis.logos", "logos", MODE),
        Rule::optional("aristotelian_modes_analysis.pathos", "pathos", PATHOS),
        Rule::optional("aristotelian_modes_analysis.ethos", "ethos", ETHOS),
        Rule::section("rhetorical_balance_analysis", "balance", BALANCE),
        Rule::optional(
            "orthodoxy_orthopathy_orthopraxy.orthodoxy_logos",
            "orthodoxy_logos",
            SCORE_ANALYSIS,
        ),
        Rule::optional(
            "orthodoxy_orthopathy_orthopraxy.orthopathy_pathos",
            "orthopathy_pathos",
            SCORE_ANALYSIS,
        ),
        Rule::optional(
            "orthodoxy_orthopathy_orthopraxy.orthopraxy_ethos",
            "orthopraxy_ethos",
            SCORE_ANALYSIS,
        ),
        Rule::section("overall_picture", "overall", ARISTOTELES_OVERALL),
    ],
    derivations: &[Derivation::columns(
        "overall.overall_rhetorical_score",
        &["logos.score", "pathos.score", "ethos.score"],
    )],
};

// dekker

const CRITERION: &[ChildField] = &[
    ChildField::renamed("score_1_to_10", "score").or(&["score"]),
    f("findings"),
    f("quotes"),
    f("improvement_point"),
];

const DEKKER_OVERALL: &[ChildField] = &[
    f("average_score"),
    f("strengths"),
    f("weaknesses"),
    f("general_recommendation"),
];

static DEKKER: RuleSet = RuleSet {
    domain: Domain::Dekker,
    rules: &[
        Rule::EachChild {
            path: "analysis_per_criterion",
            column: "",
            filter: KeyFilter::Objects,
            renames: &[("criterion_", ""), ("concrete_concrete", "concrete")],
            fields: CRITERION,
        },
        Rule::section("overall_dekker_analysis", "overall", DEKKER_OVERALL),
    ],
    derivations: &[Derivation::pattern("overall.average_score", "", ".score")],
};

// kolb

const PHASE: &[ChildField] = &[
    f("score"),
    f("analysis"),
    f("quotes"),
    f("strengths"),
    f("improvement_points"),
    f("homiletical_manifestations"),
];

const KOLB_OVERALL: &[ChildField] = &[
    f("overall_kolb_score"),
    f("summary"),
    f("strengths_top_3"),
    f("improvement_points_top_3"),
];

static KOLB: RuleSet = RuleSet {
    domain: Domain::Kolb,
    rules: &[
        Rule::optional(
            "kolb_phases_analysis.phase_1_concrete_experience",
            "concrete_experience",
            PHASE,
        ),
        Rule::optional(
            "kolb_phases_analysis.phase_2_reflective_observation",
            "reflective_observation",
            PHASE,
        ),
        Rule::optional(
            "kolb_phases_analysis.phase_3_abstract_conceptualization",
            "abstract_conceptualization",
            PHASE,
        ),
        Rule::optional(
            "kolb_phases_analysis.phase_4_active_experimentation",
            "active_experimentation",
            PHASE,
        ),
        Rule::optional_or(
            "learning_styles_analysis.dreamer",
            &["learning_styles_analysis.diverging_style"],
            "learning_style.dreamer",
            SCORE_ANALYSIS,
        ),
        Rule::optional_or(
            "learning_styles_analysis.thinker",
            &["learning_styles_analysis.assimilating_style"],
            "learning_style.thinker",
            SCORE_ANALYSIS,
        ),
        Rule::optional_or(
            "learning_styles_analysis.doer",
            &["learning_styles_analysis.accommodating_style"],
            "learning_style.doer",
            SCORE_ANALYSIS,
        ),
        Rule::optional_or(
            "learning_styles_analysis.decider",
            &["learning_styles_analysis.converging_style"],
            "learning_style.decider",
            SCORE_ANALYSIS,
        ),
        Rule::optional(
            "integrality_and_cycle.cycle_completeness",
            "integrality.cycle_completeness",
            SCORE_ANALYSIS,
        ),
        Rule::optional(
            "integrality_and_cycle.balance_between_phases",
            "integrality.balance_between_phases",
            SCORE_ANALYSIS,
        ),
        Rule::optional(
            "integrality_and_cycle.holistic_learning",
            "integrality.holistic_learning",
            SCORE_ANALYSIS,
        ),
        Rule::section("overall_picture", "overall", KOLB_OVERALL),
    ],
    derivations: &[Derivation::columns(
        "overall.overall_kolb_score",
        &[
            "concrete_experience.score",
            "reflective_observation.score",
            "abstract_conceptualization.score",
            "active_experimentation.score",
        ],
    )],
};

// schulz_von_thun

const ASPECT: &[ChildField] = &[
    f("score"),
    f("analysis"),
    f("quotes"),
    f("strengths"),
    f("improvement_points"),
];

static CONGRUENCE: [ChildField; 5] = [
    f("congruence_judgment"),
    ChildField::renamed("congruence_judgment", "congruence_level").categorical(&CONGRUENCE_LEVELS),
    f("dominant_side"),
    f("disruptions"),
    f("healing_disruption"),
];

const SCHULZ_OVERALL: &[ChildField] = &[
    f("overall_communication_score"),
    f("summary"),
    f("strengths_top_3"),
    f("improvement_points_top_3"),
];

static SCHULZ_VON_THUN: RuleSet = RuleSet {
    domain: Domain::SchulzVonThun,
    rules: &[
        Rule::optional(
            "schulz_von_thun_analysis.factual_content_blue",
            "factual_content",
            ASPECT,
        ),
        Rule::optional(
            "schulz_von_thun_analysis.self_revelation_green",
            "self_revelation",
            ASPECT,
        ),
        Rule::optional(
            "schulz_von_thun_analysis.relational_aspect_yellow",
            "relational_aspect",
            ASPECT,
        ),
        Rule::optional(
            "schulz_von_thun_analysis.appeal_aspect_red",
            "appeal_aspect",
            ASPECT,
        ),
        Rule::section("congruence_and_disruptions", "congruence", &CONGRUENCE),
        Rule::section("overall_picture", "overall", SCHULZ_OVERALL),
    ],
    derivations: &[Derivation::columns(
        "overall.overall_communication_score",
        &[
            "factual_content.score",
            "self_revelation.score",
            "relational_aspect.score",
            "appeal_aspect.score",
        ],
    )],
};

// esthetiek

const POETICS_AVERAGE: &[ChildField] =
    &[ChildField::renamed("average_score_language", "average_score")];

const DRAMATURGY_AVERAGE: &[ChildField] =
    &[ChildField::renamed("average_score_structure", "average_score")];

const KITSCH: &[ChildField] = &[f("anti_kitsch_score"), f("analysis"), f("quotes")];

const SPACE_FOR_GRACE: &[ChildField] = &[f("space_score"), f("analysis"), f("quotes")];

const ESTHETIEK_OVERALL: &[ChildField] = &[
    f("overall_aesthetic_score"),
    f("summary"),
    f("strengths_top_3"),
    f("improvement_points_top_3"),
];

static ESTHETIEK: RuleSet = RuleSet {
    domain: Domain::Esthetiek,
    rules: &[
        Rule::section("domain_a_poetics_of_language", "poetics", POETICS_AVERAGE),
        Rule::EachChild {
            path: "domain_a_poetics_of_language",
            column: "poetics",
            filter: KeyFilter::Prefixed("criterion_"),
            renames: &[("criterion_", "")],
            fields: SCORE_ANALYSIS_QUOTES,
        },
        Rule::section(
            "domain_b_dramaturgy_of_structure",
            "dramaturgy",
            DRAMATURGY_AVERAGE,
        ),
        Rule::EachChild {
            path: "domain_b_dramaturgy_of_structure",
            column: "dramaturgy",
            filter: KeyFilter::Prefixed("criterion_"),
            renames: &[("criterion_", "")],
            fields: SCORE_ANALYSIS_QUOTES,
        },
        Rule::section("kitsch_diagnosis", "kitsch", KITSCH),
        Rule::section("space_for_grace_analysis", "space_for_grace", SPACE_FOR_GRACE),
        Rule::section("overall_aesthetics", "overall", ESTHETIEK_OVERALL),
    ],
    derivations: &[
        Derivation::pattern("poetics.average_score", "poetics.", ".score"),
        Derivation::pattern("dramaturgy.average_score", "dramaturgy.", ".score"),
        Derivation::columns(
            "overall.overall_aesthetic_score",
            &["poetics.average_score", "dramaturgy.average_score"],
        ),
    ],
};

// transactional

const TRANSACTION: &[ChildField] = &[
    f("communicative_purity_score"),
    f("analysis"),
    f("primary_transaction_style"),
    f("ulterior_motives"),
];

const GAMES: &[ChildField] = &[f("detected_games"), f("absence_of_games_analysis")];

const PREACHER_ROLES: &[ChildField] = &[
    ChildField::renamed("rescuer", "preacher_rescuer"),
    ChildField::renamed("persecutor", "preacher_persecutor"),
    ChildField::renamed("victim", "preacher_victim"),
];

const DRAMA: &[ChildField] = &[f("congregation_position"), f("escape_possibilities")];

const TRANSACTIONAL_OVERALL: &[ChildField] = &[
    f("psychological_health_score"),
    f("summary"),
    f("strengths_top_3"),
    f("improvement_points_top_3"),
];

static TRANSACTIONAL: RuleSet = RuleSet {
    domain: Domain::Transactional,
    rules: &[
        Rule::optional(
            "ego_positions_scan.parent.freedom_from_critical_parent_CP",
            "parent.freedom_CP",
            SCORE_ANALYSIS_QUOTES,
        ),
        Rule::optional(
            "ego_positions_scan.parent.healthy_care_NP",
            "parent.nurturing_NP",
            SCORE_ANALYSIS_QUOTES,
        ),
        Rule::section("ego_positions_scan.adult", "adult", SCORE_ANALYSIS_QUOTES),
        Rule::optional(
            "ego_positions_scan.child.freedom_from_adapted_child_AC",
            "child.freedom_AC",
            SCORE_ANALYSIS_QUOTES,
        ),
        Rule::optional(
            "ego_positions_scan.child.free_child_FC",
            "child.free_FC",
            SCORE_ANALYSIS_QUOTES,
        ),
        Rule::section("transaction_analysis", "transaction", TRANSACTION),
        Rule::section("games_analysis", "games", GAMES),
        Rule::optional("drama_triangle_analysis.preacher_roles", "drama", PREACHER_ROLES),
        Rule::section("drama_triangle_analysis", "drama", DRAMA),
        Rule::section(
            "conclusion_and_recommendation",
            "overall",
            TRANSACTIONAL_OVERALL,
        ),
    ],
    derivations: &[Derivation::columns(
        "overall.psychological_health_score",
        &[
            "parent.freedom_CP.score",
            "parent.nurturing_NP.score",
            "adult.score",
            "child.freedom_AC.score",
            "child.free_FC.score",
        ],
    )],
};

// Dutch-keyed domains: canonical score aliases, then a generic flatten of
// every other section since their shape drifts between producer versions.

const FLATTEN_REST: Rule = Rule::FlattenRest {
    except: &["metadata"],
};

const METAPHOR_COHERENCE: &[ChildField] = &[ChildField::renamed("overall_coherentie", "overall")];

const ILLOCUTION: &[ChildField] = &[f("helderheid_score")];

const DIAGNOSIS: &[ChildField] = &[f("gebeuren_score")];

static NARRATIVE_COHERENCE: [ChildField; 2] = [
    ChildField::renamed("coherentie_score", "score"),
    ChildField::renamed("niveau", "level").categorical(&COHERENCE_LEVELS),
];

static METAPHOR: RuleSet = RuleSet {
    domain: Domain::Metaphor,
    rules: &[
        Rule::section(
            "diagnostische_evaluatie.coherentie_analyse",
            "coherentie",
            METAPHOR_COHERENCE,
        ),
        FLATTEN_REST,
    ],
    derivations: &[],
};

static SPEECH_ACT: RuleSet = RuleSet {
    domain: Domain::SpeechAct,
    rules: &[
        Rule::section(
            "drievoudige_structuur_analyse.illocutie",
            "illocutie",
            ILLOCUTION,
        ),
        Rule::section("diagnostische_evaluatie", "diagnose", DIAGNOSIS),
        FLATTEN_REST,
    ],
    derivations: &[],
};

static NARRATIVE: RuleSet = RuleSet {
    domain: Domain::Narrative,
    rules: &[
        Rule::section(
            "diagnostische_evaluatie.narratieve_coherentie",
            "coherentie",
            &NARRATIVE_COHERENCE,
        ),
        FLATTEN_REST,
    ],
    derivations: &[],
};

/// The rule set bound to a domain.
pub fn rule_set(domain: Domain) -> &'static RuleSet {
    match domain {
        Domain::Aristoteles => &ARISTOTELES,
        Domain::Dekker => &DEKKER,
        Domain::Kolb => &KOLB,
        Domain::SchulzVonThun => &SCHULZ_VON_THUN,
        Domain::Esthetiek => &ESTHETIEK,
        Domain::Transactional => &TRANSACTIONAL,
        Domain::Metaphor => &METAPHOR,
        Domain::SpeechAct => &SPEECH_ACT,
        Domain::Narrative => &NARRATIVE,
    }
}
