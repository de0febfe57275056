use crate::schema::TableDef;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A persisted entity.
///
/// `Default` must produce the zero value of every field: patches skip fields
/// that still hold it.
pub trait Record: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    fn table() -> &'static TableDef;

    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    /// Runs inside the store right before insert.
    fn before_create(&mut self) {
        if self.id().is_nil() {
            self.set_id(Uuid::new_v4());
        }
    }
}
