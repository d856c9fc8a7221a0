//! In-memory collections of site content kept in step with the API
//!
//! A [`ResourceStore`] owns the list for one resource type. Every change is
//! confirmed by the server first; the list is only written after a success
//! response and only while the view that issued the call is still mounted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::lifecycle::{Lifecycle, Ticket};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    endpoints,
    error::{ApiError, ApiResult},
    gateway::ApiGateway,
};

/// Where a resource type lives in the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Singular name used in logs
    pub name: &'static str,
    /// Bulk read
    pub list_path: &'static str,
    /// Create, and prefix of per-item update/delete
    pub admin_path: &'static str,
}

impl ResourceKind {
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.admin_path, id)
    }
}

/// An entity managed through the admin API, identified by a server-assigned id
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Body of an update request
    type Update: Serialize + Send + Sync;

    const KIND: ResourceKind;

    fn id(&self) -> &str;
}

/// A resource the operator may create
pub trait Creatable: Resource {
    type Create: Serialize + Send + Sync;
}

/// Asks the operator a yes/no question
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Proof that the operator agreed to an irreversible action
#[derive(Debug)]
pub struct Confirmed {
    _private: (),
}

impl Confirmed {
    /// Returns `None` when the operator declines
    pub fn ask(confirm: &dyn Confirm, prompt: &str) -> Option<Confirmed> {
        confirm.confirm(prompt).then_some(Confirmed { _private: () })
    }
}

/// Server-reconciled list of one resource type
pub struct ResourceStore<T: Resource> {
    gateway: Arc<dyn ApiGateway>,
    lifecycle: Lifecycle,
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Resource> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            lifecycle: self.lifecycle.clone(),
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: Resource> ResourceStore<T> {
    /// Create an empty store whose writes are scoped to `lifecycle`
    pub fn new(gateway: Arc<dyn ApiGateway>, lifecycle: Lifecycle) -> Self {
        Self {
            gateway,
            lifecycle,
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to the list if `ticket` is still live
    fn commit<R>(&self, ticket: &Ticket, change: impl FnOnce(&mut Vec<T>) -> R) -> ApiResult<R> {
        if !ticket.is_live() {
            warn!("Discarding {} response for an unmounted view", T::KIND.name);
            return Err(ApiError::Stale);
        }
        Ok(change(&mut self.lock()))
    }

    /// Replace the whole list with the server's
    pub async fn load(&self) -> ApiResult<Vec<T>> {
        let ticket = self.lifecycle.ticket();
        let fetched = endpoints::list::<T>(self.gateway.as_ref()).await?;

        let mut unique: Vec<T> = Vec::with_capacity(fetched.len());
        for item in fetched {
            if unique.iter().any(|existing| existing.id() == item.id()) {
                warn!("Dropping duplicate {} {} from listing", T::KIND.name, item.id());
                continue;
            }
            unique.push(item);
        }

        let snapshot = unique.clone();
        self.commit(&ticket, |items| *items = unique)?;
        info!("Loaded {} {} entries", snapshot.len(), T::KIND.name);
        Ok(snapshot)
    }

    /// Update one entity; it keeps its position in the list
    pub async fn update(&self, id: &str, payload: &T::Update) -> ApiResult<T> {
        let ticket = self.lifecycle.ticket();
        let updated = endpoints::update::<T>(self.gateway.as_ref(), id, payload).await?;

        let replaced = self.commit(&ticket, |items| {
            match items.iter_mut().find(|item| item.id() == id) {
                Some(slot) => {
                    *slot = updated.clone();
                    true
                }
                None => false,
            }
        })?;

        if replaced {
            info!("Updated {} {}", T::KIND.name, id);
        } else {
            debug!("Updated {} {} is no longer listed", T::KIND.name, id);
        }
        Ok(updated)
    }

    /// Delete one entity after the operator confirmed it
    pub async fn remove(&self, id: &str, _confirmed: Confirmed) -> ApiResult<()> {
        let ticket = self.lifecycle.ticket();
        endpoints::delete::<T>(self.gateway.as_ref(), id).await?;

        self.commit(&ticket, |items| items.retain(|item| item.id() != id))?;
        info!("Removed {} {}", T::KIND.name, id);
        Ok(())
    }

    /// Snapshot of the list
    pub fn items(&self) -> Vec<T> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.lock().iter().find(|item| item.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Entities matching `predicate`, evaluated against the current list
    pub fn filtered_by(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.lock().iter().filter(|item| predicate(item)).cloned().collect()
    }

    /// Drop every entry without a network call
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Creatable> ResourceStore<T> {
    /// Create an entity; it is prepended once the server returns it with its id
    pub async fn create(&self, payload: &T::Create) -> ApiResult<T> {
        let ticket = self.lifecycle.ticket();
        let created = endpoints::create::<T>(self.gateway.as_ref(), payload).await?;

        self.commit(&ticket, |items| {
            match items.iter_mut().find(|item| item.id() == created.id()) {
                Some(slot) => *slot = created.clone(),
                None => items.insert(0, created.clone()),
            }
        })?;
        info!("Created {} {}", T::KIND.name, created.id());
        Ok(created)
    }
}
