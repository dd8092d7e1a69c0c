use crate::error::QueryError;

/// Default query window when the request does not name one.
pub const DEFAULT_TIMEFRAME: &str = "today 12-m";

/// Default keyword ceiling. The upstream widget API rejects comparison
/// payloads with more than five items.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

/// A validated trends request.
///
/// Keyword and geo order is preserved from the raw parameters; output
/// ordering downstream depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsQuery {
    pub keywords: Vec<String>,
    pub geos: Vec<String>,
    pub timeframe: String,
}

impl TrendsQuery {
    /// Validates raw query parameters.
    ///
    /// `keyword` is a required comma-separated list, `geo` an optional one
    /// (absent means worldwide, represented as a single empty geo code).
    /// `timeframe` is passed through verbatim; the upstream owns its syntax.
    pub fn parse(
        keyword: Option<&str>,
        geo: Option<&str>,
        timeframe: Option<&str>,
        max_keywords: usize,
    ) -> Result<Self, QueryError> {
        let keyword = keyword.map(str::trim).unwrap_or_default();
        if keyword.is_empty() {
            return Err(QueryError::MissingKeyword);
        }

        let keywords: Vec<String> = keyword.split(',').map(|k| k.trim().to_string()).collect();
        if keywords.len() > max_keywords {
            return Err(QueryError::TooManyKeywords {
                limit: max_keywords,
                actual: keywords.len(),
            });
        }

        let geos = match geo.map(str::trim) {
            None | Some("") => vec![String::new()],
            Some(geo) => geo.split(',').map(|g| g.trim().to_string()).collect(),
        };

        let timeframe = match timeframe.map(str::trim) {
            None | Some("") => DEFAULT_TIMEFRAME.to_string(),
            Some(timeframe) => timeframe.to_string(),
        };

        Ok(Self {
            keywords,
            geos,
            timeframe,
        })
    }
}
