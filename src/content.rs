//! Movie vs. series inference.

/// Whether a title is organized as a movie or as a series with seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A single film, stored flat under its title directory.
    Movie,
    /// An episodic show, stored under `Season NN` directories.
    Series,
}

impl ContentKind {
    /// The media type segment used by the metadata catalog (`movie` / `tv`).
    #[must_use]
    pub const fn catalog_type(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }
}

/// Picks the name used for inference and metadata lookup.
///
/// The user's query wins when it is non-empty, otherwise the per-link label
/// is used.
#[must_use]
pub fn effective_name<'a>(user_query: &'a str, display_name: &'a str) -> &'a str {
    let query = user_query.trim();
    if query.is_empty() { display_name } else { query }
}

/// Infers the content kind from a name: anything mentioning "movie" or
/// "film" (any case) is a movie, everything else a series.
#[must_use]
pub fn infer(effective_name: &str) -> ContentKind {
    let lower = effective_name.to_lowercase();
    if lower.contains("movie") || lower.contains("film") {
        ContentKind::Movie
    } else {
        ContentKind::Series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_keywords_any_case() {
        assert_eq!(infer("Some Movie"), ContentKind::Movie);
        assert_eq!(infer("ONE PIECE FILM RED"), ContentKind::Movie);
        assert_eq!(infer("Demon Slayer the movie: Mugen Train"), ContentKind::Movie);
    }

    #[test]
    fn substring_match_counts() {
        // "filmography" contains "film"
        assert_eq!(infer("filmography"), ContentKind::Movie);
    }

    #[test]
    fn everything_else_is_series() {
        assert_eq!(infer("Attack on Titan"), ContentKind::Series);
        assert_eq!(infer(""), ContentKind::Series);
    }

    #[test]
    fn effective_name_prefers_query() {
        assert_eq!(effective_name("Naruto", "Season 2"), "Naruto");
        assert_eq!(effective_name("", "Naruto Movie"), "Naruto Movie");
        assert_eq!(effective_name("   ", "Bleach"), "Bleach");
    }

    #[test]
    fn catalog_types() {
        assert_eq!(ContentKind::Movie.catalog_type(), "movie");
        assert_eq!(ContentKind::Series.catalog_type(), "tv");
    }
}
