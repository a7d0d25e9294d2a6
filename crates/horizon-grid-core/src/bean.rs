//! Bean registry for Horizon Grid.
//!
//! Every grid instance owns one [`BeanRegistry`]. Services and the entities
//! they create (columns, column groups) register themselves on construction
//! and are tracked until they are destroyed. The registry gives entities a
//! stable identity ([`BeanId`]) that is never reused, even after the entity
//! is destroyed, and drives the three lifecycle phases:
//!
//! 1. **construct** - [`BeanRegistry::register`] issues the id
//! 2. **post-construct** - [`BeanRegistry::create_bean`] runs [`Bean::post_construct`]
//! 3. **pre-destroy** - [`BeanRegistry::destroy_bean`] runs [`Bean::pre_destroy`]
//!   and removes the bean
//!
//! There is no process-wide registry: a registry is created per grid and
//! passed to the components that need it.

use std::any::TypeId;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{BeanError, BeanResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a bean in a [`BeanRegistry`].
    ///
    /// Ids are versioned: once a bean is destroyed its id never matches a
    /// later bean, which makes `BeanId` usable as an identity key.
    pub struct BeanId;
}

/// Lifecycle hooks for registry-managed beans.
pub trait Bean: Send + Sync {
    /// The id issued to this bean by [`BeanRegistry::register`].
    fn bean_id(&self) -> BeanId;

    /// Called once after the bean is fully constructed.
    fn post_construct(&self) {}

    /// Called once before the bean is removed from the registry.
    fn pre_destroy(&self) {}
}

/// Internal data stored in the registry for each bean.
struct BeanData {
    /// Human-readable name for debugging and lookup.
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    constructed: bool,
}

/// Registry of live beans for one grid instance.
pub struct BeanRegistry {
    beans: Mutex<SlotMap<BeanId, BeanData>>,
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            beans: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Register a new bean of type `T` and return its id.
    pub fn register<T: 'static>(&self, name: impl Into<String>) -> BeanId {
        let data = BeanData {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            constructed: false,
        };
        let id = self.beans.lock().insert(data);
        tracing::trace!(target: targets::BEAN, ?id, type_name = std::any::type_name::<T>(), "registered bean");
        id
    }

    /// Run the post-construct phase for a registered bean.
    ///
    /// Calling this more than once is a no-op.
    pub fn create_bean<B: Bean + ?Sized>(&self, bean: &B) -> BeanResult<()> {
        let id = bean.bean_id();
        {
            let mut beans = self.beans.lock();
            let data = beans.get_mut(id).ok_or(BeanError::InvalidBeanId(id))?;
            if data.constructed {
                return Ok(());
            }
            data.constructed = true;
        }
        bean.post_construct();
        Ok(())
    }

    /// Run the pre-destroy phase and remove the bean.
    #[tracing::instrument(skip_all, target = "horizon_grid_core::bean", level = "trace")]
    pub fn destroy_bean<B: Bean + ?Sized>(&self, bean: &B) -> BeanResult<()> {
        let id = bean.bean_id();
        if !self.contains(id) {
            return Err(BeanError::AlreadyDestroyed(id));
        }
        bean.pre_destroy();
        self.beans.lock().remove(id);
        tracing::trace!(target: targets::BEAN, ?id, "destroyed bean");
        Ok(())
    }

    /// Check whether a bean is still alive.
    pub fn contains(&self, id: BeanId) -> bool {
        self.beans.lock().contains_key(id)
    }

    /// Number of live beans.
    pub fn len(&self) -> usize {
        self.beans.lock().len()
    }

    /// Whether the registry holds no beans.
    pub fn is_empty(&self) -> bool {
        self.beans.lock().is_empty()
    }

    /// Number of live beans of type `T`.
    pub fn count_of<T: 'static>(&self) -> usize {
        let target = TypeId::of::<T>();
        self.beans
            .lock()
            .values()
            .filter(|data| data.type_id == target)
            .count()
    }

    /// The name a bean was registered with.
    pub fn bean_name(&self, id: BeanId) -> BeanResult<String> {
        self.beans
            .lock()
            .get(id)
            .map(|d| d.name.clone())
            .ok_or(BeanError::InvalidBeanId(id))
    }

    /// The type name a bean was registered with.
    pub fn type_name(&self, id: BeanId) -> BeanResult<&'static str> {
        self.beans
            .lock()
            .get(id)
            .map(|d| d.type_name)
            .ok_or(BeanError::InvalidBeanId(id))
    }
}
