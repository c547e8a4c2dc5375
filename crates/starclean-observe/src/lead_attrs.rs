//! Span attribute names for quote and booking instrumentation.
//!
//! All constants are string slices usable as field names in
//! `tracing::info_span!`.
//!
//! Span naming convention: `"{operation}"` (e.g., `"submit_lead"`)

// --- Request attributes ---

/// The wizard session ID.
pub const SESSION_ID: &str = "starclean.session.id";

/// Current wizard step when the span started (e.g., "plan_review").
pub const WIZARD_STEP: &str = "starclean.wizard.step";

/// Navigation action requested (e.g., "next", "skip_scheduling").
pub const WIZARD_ACTION: &str = "starclean.wizard.action";

/// Funnel stage of a submission (e.g., "Quote Range Generated").
pub const LEAD_STAGE: &str = "starclean.lead.stage";

/// Label of the short form a lead came from.
pub const LEAD_FORM_SOURCE: &str = "starclean.lead.form_source";

/// Zip code being resolved.
pub const ZIP_CODE: &str = "starclean.zip.code";

// --- Result attributes ---

/// Lower bound of the first-visit price.
pub const QUOTE_INITIAL_MIN: &str = "starclean.quote.initial_min";

/// Pricing formula label.
pub const QUOTE_VERSION: &str = "starclean.quote.version";

// --- Operation name values ---

/// Price calculation.
pub const OP_PRICE_QUOTE: &str = "price_quote";

/// Short-form lead capture.
pub const OP_CAPTURE_LEAD: &str = "capture_lead";

/// Wizard field edit.
pub const OP_WIZARD_INPUT: &str = "wizard_input";

/// Wizard navigation (may submit a lead).
pub const OP_WIZARD_ACTION: &str = "wizard_action";

/// Zip-code lookup.
pub const OP_ZIP_LOOKUP: &str = "zip_lookup";
