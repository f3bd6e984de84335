pub mod entry;
pub mod media;
pub mod selection;
pub mod session;

pub use entry::{format_entry, parse_list, Entry};
pub use media::{
    CatalogCandidate, MediaDetails, MediaKind, ProviderRegion, RatingKind, TmdbDetails,
    TmdbProvidersResponse, TmdbSearchResult, WatchProvider,
};
pub use selection::Selection;
pub use session::{
    CommitStrategy, DocumentHandle, FolderHandle, Page, SessionPointers, GOOGLE_DOC_MIME,
    PLAIN_TEXT_MIME,
};
