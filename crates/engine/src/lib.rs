//! Page publishing and inheritance services.
//!
//! Each service wraps the repositories in `trellis-db` and the rules in
//! `trellis-core`. Every mutating operation is one transaction that starts by
//! locking the page row.

pub mod error;
pub mod hierarchy;
pub mod hostname_router;
pub mod publication;
pub mod resolver;
pub mod transforms;
pub mod versions;

use std::sync::Arc;

use sqlx::PgPool;
use trellis_core::content_ref::{ObjectKind, TransformRegistry};
use trellis_core::inheritance::InheritanceResolver;
use trellis_core::registry::{LayoutRegistry, ThemeRegistry};
use trellis_core::widget_types::WidgetTypeRegistry;

pub use error::{EngineError, EngineResult};
pub use hierarchy::HierarchyStore;
pub use hostname_router::HostnameRouter;
pub use publication::PublicationStateMachine;
pub use resolver::PageResolver;
pub use versions::VersionStore;

/// Transaction type used for the unit of work.
pub(crate) type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// All engine services over one pool.
#[derive(Clone)]
pub struct Engine {
    pub hierarchy: HierarchyStore,
    pub router: HostnameRouter,
    pub versions: VersionStore,
    pub publication: PublicationStateMachine,
    pub resolver: PageResolver,
}

impl Engine {
    /// Wire every service. The engine registers its own `page` content
    /// transform; `extra_transforms` adds the ones owned by other systems.
    pub fn new(
        pool: PgPool,
        layouts: Arc<dyn LayoutRegistry>,
        themes: Arc<dyn ThemeRegistry>,
        widget_types: Arc<dyn WidgetTypeRegistry>,
        extra_transforms: TransformRegistry,
    ) -> Self {
        let transforms = extra_transforms.register(
            ObjectKind::Page,
            Arc::new(transforms::PageLinkTransform::new(pool.clone())),
        );
        Self {
            hierarchy: HierarchyStore::new(pool.clone()),
            router: HostnameRouter::new(pool.clone()),
            versions: VersionStore::new(pool.clone(), widget_types),
            publication: PublicationStateMachine::new(pool.clone()),
            resolver: PageResolver::new(pool, InheritanceResolver::new(layouts, themes), transforms),
        }
    }
}
