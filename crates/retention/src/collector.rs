//! Collector: drain a paginated listing into a sorted [`ObjectSet`]

use crate::error::StoreError;
use crate::events::{EventSink, PruneEvent};
use crate::object::{is_directory_marker, ObjectRecord, ObjectSet};
use crate::store::ObjectStore;

/// A drained listing
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub set: ObjectSet,
    pub pages: usize,
    /// Keys ending in `/`, left out of the set
    pub directory_markers: usize,
    /// Objects without a modification time, left out of the set
    pub undated: usize,
}

/// List every object under `prefix` and freeze the result
///
/// The listing is drained completely before anything is returned; any store
/// error aborts the collection.
pub async fn collect(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    sink: &mut dyn EventSink,
) -> Result<Collected, StoreError> {
    let mut records = Vec::new();
    let mut pages = 0;
    let mut directory_markers = 0;
    let mut undated = 0;
    let mut token: Option<String> = None;

    loop {
        let page = store.list_page(bucket, prefix, token.as_deref()).await?;
        pages += 1;
        sink.emit(PruneEvent::PageListed {
            page: pages,
            objects: page.objects.len(),
        });

        for object in page.objects {
            if is_directory_marker(&object.key) {
                directory_markers += 1;
                continue;
            }
            match object.last_modified {
                Some(last_modified) => records.push(ObjectRecord::new(object.key, last_modified)),
                None => {
                    undated += 1;
                    sink.emit(PruneEvent::UndatedObjectSkipped { key: object.key });
                }
            }
        }

        match page.next_token {
            Some(next) if token.as_deref() == Some(next.as_str()) => {
                return Err(StoreError::StalledPagination { token: next });
            }
            Some(next) => token = Some(next),
            None => break,
        }
    }

    let set = ObjectSet::from_unsorted(records);
    sink.emit(PruneEvent::Listed {
        objects: set.len(),
        pages,
        directory_markers,
        undated,
    });

    Ok(Collected {
        set,
        pages,
        directory_markers,
        undated,
    })
}
