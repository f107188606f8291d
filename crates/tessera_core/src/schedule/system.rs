//! # Systems
//!
//! A system is a behavior that runs once per update over every active
//! entity owning its required components. Before the first update it
//! declares, per component and singleton type, whether it reads or writes.
//! Those declarations become a [`SystemType`], which both filters the
//! entities the system sees and gates every access it makes.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use super::context::SystemContext;
use super::mod_queue::ModQueue;
use crate::ecs::{
    Component, ComponentMask, ComponentRegistry, ComponentTypeId, Singleton, SingletonRegistry,
    SingletonTypeId, World,
};
use crate::error::{EcsError, EcsResult, OrPanic};

/// Time elapsed since the previous update, in seconds.
pub type TimeDelta = f32;

/// How a system uses a component or singleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read only.
    Read,
    /// Read and write.
    Write,
}

impl Access {
    /// Name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Whether an entity must own a component to be visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Existence {
    /// Entities without the component are skipped.
    Required,
    /// Entities are visited either way.
    Optional,
}

/// Dense identifier of a registered system type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SystemTypeId(u32);

impl SystemTypeId {
    /// Returns the dense index of this id.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sys{}", self.0)
    }
}

/// Access descriptor of one system.
///
/// Invariants: `writable ⊆ readable` and `required ⊆ readable`. The same
/// holds for the singleton masks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemType {
    id: SystemTypeId,
    name: &'static str,
    required: ComponentMask,
    readable: ComponentMask,
    writable: ComponentMask,
    singleton_read: u32,
    singleton_write: u32,
}

impl SystemType {
    /// Creates a descriptor that declares nothing.
    #[must_use]
    pub const fn new(id: SystemTypeId, name: &'static str) -> Self {
        Self {
            id,
            name,
            required: ComponentMask::EMPTY,
            readable: ComponentMask::EMPTY,
            writable: ComponentMask::EMPTY,
            singleton_read: 0,
            singleton_write: 0,
        }
    }

    /// Returns the id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SystemTypeId {
        self.id
    }

    /// Returns the system's type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declares use of component type `id`.
    ///
    /// Every declared component becomes readable. Redeclaring a component
    /// replaces its existence and access.
    pub fn use_component(&mut self, id: ComponentTypeId, existence: Existence, access: Access) {
        self.required.set(id, existence == Existence::Required);
        self.readable.insert(id);
        self.writable.set(id, access == Access::Write);
    }

    /// Declares use of singleton type `id`.
    pub fn use_singleton(&mut self, id: SingletonTypeId, access: Access) {
        self.singleton_read |= id.bit();
        if access == Access::Write {
            self.singleton_write |= id.bit();
        } else {
            self.singleton_write &= !id.bit();
        }
    }

    /// Returns the components an entity must own to be visited.
    #[inline]
    #[must_use]
    pub const fn required(&self) -> ComponentMask {
        self.required
    }

    /// Returns the components the system may read.
    #[inline]
    #[must_use]
    pub const fn readable(&self) -> ComponentMask {
        self.readable
    }

    /// Returns the components the system may write.
    #[inline]
    #[must_use]
    pub const fn writable(&self) -> ComponentMask {
        self.writable
    }

    /// Checks if component type `id` may be read.
    #[inline]
    #[must_use]
    pub const fn can_read(&self, id: ComponentTypeId) -> bool {
        self.readable.contains(id)
    }

    /// Checks if component type `id` may be written.
    #[inline]
    #[must_use]
    pub const fn can_write(&self, id: ComponentTypeId) -> bool {
        self.writable.contains(id)
    }

    /// Checks if singleton `id` may be read.
    #[inline]
    #[must_use]
    pub const fn can_read_singleton(&self, id: SingletonTypeId) -> bool {
        self.singleton_read & id.bit() != 0
    }

    /// Checks if singleton `id` may be written.
    #[inline]
    #[must_use]
    pub const fn can_write_singleton(&self, id: SingletonTypeId) -> bool {
        self.singleton_write & id.bit() != 0
    }

    /// Checks a component access against the declarations.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AccessDenied`] naming `target` if the access was
    /// not declared.
    pub fn check_access(
        &self,
        id: ComponentTypeId,
        access: Access,
        target: &'static str,
    ) -> EcsResult<()> {
        let allowed = match access {
            Access::Read => self.can_read(id),
            Access::Write => self.can_write(id),
        };
        self.grant(allowed, access, target)
    }

    /// Checks a singleton access against the declarations.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AccessDenied`] naming `target` if the access was
    /// not declared.
    pub fn check_singleton_access(
        &self,
        id: SingletonTypeId,
        access: Access,
        target: &'static str,
    ) -> EcsResult<()> {
        let allowed = match access {
            Access::Read => self.can_read_singleton(id),
            Access::Write => self.can_write_singleton(id),
        };
        self.grant(allowed, access, target)
    }

    fn grant(&self, allowed: bool, access: Access, target: &'static str) -> EcsResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(EcsError::AccessDenied {
                system: self.name,
                access: access.as_str(),
                target,
            })
        }
    }
}

/// Declaration surface handed to [`System::initialize`].
pub struct SystemSetup<'a> {
    components: &'a ComponentRegistry,
    singletons: &'a SingletonRegistry,
    kind: &'a mut SystemType,
}

impl<'a> SystemSetup<'a> {
    /// Wraps a descriptor for declaration against `world`'s registries.
    pub fn new(world: &'a World, kind: &'a mut SystemType) -> Self {
        Self {
            components: world.components(),
            singletons: world.singletons(),
            kind,
        }
    }

    /// Declares a component every visited entity must own.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn require<T: Component>(&mut self, access: Access) -> ComponentTypeId {
        let id = self.components.id_of::<T>();
        self.kind.use_component(id, Existence::Required, access);
        id
    }

    /// Declares a component visited entities may or may not own.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn optional<T: Component>(&mut self, access: Access) -> ComponentTypeId {
        let id = self.components.id_of::<T>();
        self.kind.use_component(id, Existence::Optional, access);
        id
    }

    /// Declares use of singleton `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    #[track_caller]
    pub fn singleton<T: Singleton>(&mut self, access: Access) -> SingletonTypeId {
        let id = self.singletons.id_of::<T>();
        self.kind.use_singleton(id, access);
        id
    }

    /// Declares a component by id.
    pub fn component(&mut self, id: ComponentTypeId, existence: Existence, access: Access) {
        self.kind.use_component(id, existence, access);
    }

    /// Returns the descriptor built so far.
    #[must_use]
    pub fn system_type(&self) -> &SystemType {
        self.kind
    }
}

/// A behavior driven by the [`Dispatcher`](super::Dispatcher).
///
/// # Example
///
/// ```rust,ignore
/// struct Gravity;
///
/// impl System for Gravity {
///     fn initialize(&mut self, setup: &mut SystemSetup<'_>) {
///         setup.require::<Velocity>(Access::Write);
///     }
///
///     fn update(&mut self, ctx: &mut SystemContext<'_>, _mods: &mut ModQueue, delta: TimeDelta) {
///         ctx.for_each(|mut entity| {
///             if let Some(vel) = entity.write::<Velocity>() {
///                 vel.y -= 9.81 * delta;
///             }
///         });
///     }
/// }
/// ```
pub trait System: Send + 'static {
    /// Declares component and singleton use. Called once.
    fn initialize(&mut self, setup: &mut SystemSetup<'_>);

    /// Runs one pass over the matching entities.
    ///
    /// Structural changes go through `mods`; they are applied after this
    /// call returns and before the next system runs.
    fn update(&mut self, ctx: &mut SystemContext<'_>, mods: &mut ModQueue, delta: TimeDelta);
}

/// A registered system and its descriptor.
pub(crate) struct SystemEntry {
    pub(crate) kind: SystemType,
    pub(crate) system: Box<dyn System>,
}

/// Systems in registration order.
#[derive(Default)]
pub struct SystemRegistry {
    ids: HashMap<TypeId, SystemTypeId>,
    entries: Vec<SystemEntry>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `system`. Its descriptor stays empty until initialized.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateSystem`] if a system of type `S` is
    /// already registered.
    pub fn try_register<S: System>(&mut self, system: S) -> EcsResult<SystemTypeId> {
        let name = std::any::type_name::<S>();
        if self.ids.contains_key(&TypeId::of::<S>()) {
            return Err(EcsError::DuplicateSystem { name });
        }

        #[allow(clippy::cast_possible_truncation)]
        let id = SystemTypeId(self.entries.len() as u32);
        self.ids.insert(TypeId::of::<S>(), id);
        self.entries.push(SystemEntry {
            kind: SystemType::new(id, name),
            system: Box::new(system),
        });

        tracing::debug!(system = name, id = id.index(), "registered system");
        Ok(id)
    }

    /// Adds `system`.
    ///
    /// # Panics
    ///
    /// Panics if a system of type `S` is already registered.
    #[track_caller]
    pub fn register<S: System>(&mut self, system: S) -> SystemTypeId {
        self.try_register(system).or_panic()
    }

    /// Returns the id of system type `S`, if registered.
    #[must_use]
    pub fn id_of<S: System>(&self) -> Option<SystemTypeId> {
        self.ids.get(&TypeId::of::<S>()).copied()
    }

    /// Returns the descriptor of `id`.
    #[must_use]
    #[track_caller]
    pub fn get(&self, id: SystemTypeId) -> &SystemType {
        &self.entries[id.index()].kind
    }

    /// Returns the number of systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SystemType> {
        self.entries.iter().map(|entry| &entry.kind)
    }

    /// Runs `initialize` for system `id` against `world`.
    #[track_caller]
    pub fn initialize(&mut self, id: SystemTypeId, world: &World) {
        let entry = &mut self.entries[id.index()];
        let mut setup = SystemSetup::new(world, &mut entry.kind);
        entry.system.initialize(&mut setup);

        tracing::debug!(
            system = entry.kind.name(),
            required = entry.kind.required().len(),
            readable = entry.kind.readable().len(),
            writable = entry.kind.writable().len(),
            "initialized system"
        );
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [SystemEntry] {
        &mut self.entries
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(SystemType::name)).finish()
    }
}
