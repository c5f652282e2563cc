//! External lookups used by the pipeline stages

pub mod lastfm;
pub mod lookup_client;
pub mod playlist_aggregator;
pub mod similarity;
pub mod track_resolver;
pub mod video_matcher;
pub mod video_resolver;

pub use lastfm::LastfmApi;
pub use lookup_client::{Body, LookupClient, LookupRequest, LookupResponse};
pub use playlist_aggregator::PlaylistAggregator;
pub use similarity::SimilarityExpander;
pub use track_resolver::TrackResolver;
pub use video_matcher::{matcher_for, AnchorMatcher, AnyMatcher, EmbeddedDataMatcher, VideoMatcher};
pub use video_resolver::{VideoResolver, VideoSearchConfig};
