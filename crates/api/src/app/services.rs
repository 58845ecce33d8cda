use std::sync::Arc;

use hireboard_infra::{OrganizationRepository, PostingRepository, Storage};

/// Repositories shared by every handler (behind an `Extension`).
#[derive(Clone)]
pub struct AppServices {
    pub organizations: OrganizationRepository,
    pub postings: PostingRepository,
}

impl AppServices {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            organizations: OrganizationRepository::new(storage.clone()),
            postings: PostingRepository::new(storage),
        }
    }
}
