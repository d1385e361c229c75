//! [`StoreEntity`] implementation for the Transaction record.
//!
//! Transactions are write-once: the attempt happens, the result is final.
//! `Update = ()` and a no-op `apply` encode that at the type level.

use crate::framework::StoreEntity;
use crate::model::Transaction;

impl StoreEntity for Transaction {
    type Id = String;
    type Update = ();

    fn id(&self) -> &String {
        &self.id
    }

    fn apply(&mut self, _update: ()) {}
}
