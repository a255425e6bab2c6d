//! Action catalog: kinds, their menu metadata, and the registry.
//!
//! The registry is pure data for the UI plus the name→kind resolution the
//! bridge and tests use. It is built once during plugin setup; duplicate
//! names are a fatal startup error because a registry with ambiguous names
//! cannot be trusted for the rest of the run.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

/// Every action the engine can instantiate. New kinds implement
/// `ReversibleAction` and get a factory arm in `actions::new_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    Scale,
    Mark,
    NewNode,
    EditNode,
    DeleteNode,
}

/// Handle into the registry's type arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionStateId(usize);

/// Handle into the registry's group arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// A menu entry: either a concrete action type or a group of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEntry {
    Type(ActionStateId),
    Group(GroupId),
}

/// Immutable metadata of one user-triggerable action kind.
#[derive(Debug, Clone)]
pub struct ActionStateType {
    /// Globally unique within the registry.
    pub name: String,
    pub description: String,
    pub color: Color,
    pub icon: char,
    /// Owning group, if any. Back-reference only; the group owns the order.
    pub group: Option<GroupId>,
    pub kind: ActionKind,
}

/// An ordered collection of action types and sub-groups for menu display.
/// Children are only ever appended, so the group tree is acyclic.
#[derive(Debug, Clone)]
pub struct ActionStateGroup {
    pub name: String,
    pub description: String,
    pub color: Color,
    pub icon: char,
    pub parent: Option<GroupId>,
    pub children: Vec<RegistryEntry>,
}

/// Registry construction/lookup failures.
#[derive(Debug)]
pub enum RegistryError {
    /// Another type or group already uses this name.
    DuplicateName(String),
    /// No type registered under this name.
    NotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => {
                write!(f, "action state name '{name}' is already registered")
            }
            RegistryError::NotFound(name) => write!(f, "no action state named '{name}'"),
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// ActionStateRegistry resource
// ---------------------------------------------------------------------------

/// The process-wide catalog of action kinds, owned by the ECS world rather
/// than ambient statics so tests and embedders control its lifetime.
#[derive(Resource, Default)]
pub struct ActionStateRegistry {
    types: Vec<ActionStateType>,
    groups: Vec<ActionStateGroup>,
    by_name: HashMap<String, RegistryEntry>,
    roots: Vec<RegistryEntry>,
}

impl ActionStateRegistry {
    /// Registers an action type. Fails if the name is taken anywhere in the
    /// registry (groups included).
    pub fn register(&mut self, ty: ActionStateType) -> Result<ActionStateId, RegistryError> {
        if self.by_name.contains_key(&ty.name) {
            return Err(RegistryError::DuplicateName(ty.name));
        }
        let id = ActionStateId(self.types.len());
        self.by_name.insert(ty.name.clone(), RegistryEntry::Type(id));
        match ty.group {
            Some(gid) => self.groups[gid.0].children.push(RegistryEntry::Type(id)),
            None => self.roots.push(RegistryEntry::Type(id)),
        }
        self.types.push(ty);
        Ok(id)
    }

    /// Registers a (possibly nested) group.
    pub fn register_group(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        color: Color,
        icon: char,
        parent: Option<GroupId>,
    ) -> Result<GroupId, RegistryError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let gid = GroupId(self.groups.len());
        self.by_name.insert(name.clone(), RegistryEntry::Group(gid));
        match parent {
            Some(p) => self.groups[p.0].children.push(RegistryEntry::Group(gid)),
            None => self.roots.push(RegistryEntry::Group(gid)),
        }
        self.groups.push(ActionStateGroup {
            name,
            description: description.into(),
            color,
            icon,
            parent,
            children: Vec::new(),
        });
        Ok(gid)
    }

    /// Resolves an action type by name.
    pub fn lookup(&self, name: &str) -> Result<&ActionStateType, RegistryError> {
        match self.by_name.get(name) {
            Some(RegistryEntry::Type(id)) => Ok(&self.types[id.0]),
            _ => Err(RegistryError::NotFound(name.to_string())),
        }
    }

    pub fn get(&self, id: ActionStateId) -> Option<&ActionStateType> {
        self.types.get(id.0)
    }

    pub fn group(&self, id: GroupId) -> Option<&ActionStateGroup> {
        self.groups.get(id.0)
    }

    /// Metadata for a kind; every registered kind has exactly one entry in
    /// the default catalog.
    pub fn for_kind(&self, kind: ActionKind) -> Option<&ActionStateType> {
        self.types.iter().find(|t| t.kind == kind)
    }

    /// Top-level menu entries in registration order. A fresh iterator per
    /// call, so menu construction can restart it at will.
    pub fn root_entries(&self) -> impl Iterator<Item = RegistryEntry> + '_ {
        self.roots.iter().copied()
    }
}

/// The built-in catalog. Called once from `EnginePlugin::build`; a duplicate
/// name here is a programming error and aborts startup.
pub fn register_default_catalog(reg: &mut ActionStateRegistry) -> Result<(), RegistryError> {
    reg.register(ActionStateType {
        name: "Move".to_string(),
        description: "Grab a node and drag it, re-parenting it onto the container it is dropped on".to_string(),
        color: Color::srgb(0.85, 0.15, 0.15),
        icon: 'M',
        group: None,
        kind: ActionKind::Move,
    })?;
    reg.register(ActionStateType {
        name: "Scale".to_string(),
        description: "Drag vertically to scale a node uniformly".to_string(),
        color: Color::srgb(0.15, 0.45, 0.85),
        icon: 'S',
        group: None,
        kind: ActionKind::Scale,
    })?;
    reg.register(ActionStateType {
        name: "Mark".to_string(),
        description: "Toggle the mark on a node".to_string(),
        color: Color::srgb(0.9, 0.75, 0.1),
        icon: '!',
        group: None,
        kind: ActionKind::Mark,
    })?;

    let nodes = reg.register_group(
        "Nodes",
        "Create, edit, and remove nodes",
        Color::srgb(0.2, 0.7, 0.3),
        'N',
        None,
    )?;
    reg.register(ActionStateType {
        name: "New Node".to_string(),
        description: "Add a child node inside the clicked container".to_string(),
        color: Color::srgb(0.2, 0.7, 0.3),
        icon: '+',
        group: Some(nodes),
        kind: ActionKind::NewNode,
    })?;
    reg.register(ActionStateType {
        name: "Edit Node".to_string(),
        description: "Change a node's label".to_string(),
        color: Color::srgb(0.5, 0.5, 0.8),
        icon: 'E',
        group: Some(nodes),
        kind: ActionKind::EditNode,
    })?;
    reg.register(ActionStateType {
        name: "Delete Node".to_string(),
        description: "Remove a node and everything inside it".to_string(),
        color: Color::srgb(0.6, 0.2, 0.2),
        icon: 'X',
        group: Some(nodes),
        kind: ActionKind::DeleteNode,
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Current selection + change notification
// ---------------------------------------------------------------------------

/// The action kind the next foreground instance will be created from.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentAction {
    pub kind: ActionKind,
}

impl Default for CurrentAction {
    fn default() -> Self {
        Self {
            kind: ActionKind::Move,
        }
    }
}

/// Request to switch the foreground action to a new kind.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectActionEvent(pub ActionKind);

/// Emitted by the selection funnel whenever the current kind changes.
/// Observers subscribe with an `EventReader`; ordering follows system order,
/// which makes the notification deterministic and testable.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionStateChanged {
    pub kind: ActionKind,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str, kind: ActionKind) -> ActionStateType {
        ActionStateType {
            name: name.to_string(),
            description: String::new(),
            color: Color::WHITE,
            icon: '?',
            group: None,
            kind,
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut reg = ActionStateRegistry::default();
        reg.register(ty("Move", ActionKind::Move)).unwrap();
        let err = reg.register(ty("Move", ActionKind::Scale));
        assert!(matches!(err, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn group_names_share_the_namespace() {
        let mut reg = ActionStateRegistry::default();
        reg.register_group("Nodes", "", Color::WHITE, 'N', None)
            .unwrap();
        let err = reg.register(ty("Nodes", ActionKind::Mark));
        assert!(matches!(err, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn distinct_names_register_and_resolve() {
        let mut reg = ActionStateRegistry::default();
        for (name, kind) in [
            ("Move", ActionKind::Move),
            ("Scale", ActionKind::Scale),
            ("Mark", ActionKind::Mark),
        ] {
            reg.register(ty(name, kind)).unwrap();
        }
        assert_eq!(reg.lookup("Scale").unwrap().kind, ActionKind::Scale);
        assert!(matches!(
            reg.lookup("Bulldoze"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn root_entries_keep_registration_order_and_restart() {
        let mut reg = ActionStateRegistry::default();
        let a = reg.register(ty("A", ActionKind::Move)).unwrap();
        let g = reg
            .register_group("G", "", Color::WHITE, 'g', None)
            .unwrap();
        let b = reg.register(ty("B", ActionKind::Mark)).unwrap();

        let expected = vec![
            RegistryEntry::Type(a),
            RegistryEntry::Group(g),
            RegistryEntry::Type(b),
        ];
        assert_eq!(reg.root_entries().collect::<Vec<_>>(), expected);
        // Restartable: a second pass sees the same sequence.
        assert_eq!(reg.root_entries().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn grouped_types_are_not_roots() {
        let mut reg = ActionStateRegistry::default();
        let g = reg
            .register_group("G", "", Color::WHITE, 'g', None)
            .unwrap();
        let mut t = ty("T", ActionKind::NewNode);
        t.group = Some(g);
        let id = reg.register(t).unwrap();
        assert_eq!(reg.root_entries().count(), 1);
        assert_eq!(reg.group(g).unwrap().children, vec![RegistryEntry::Type(id)]);
    }

    #[test]
    fn default_catalog_has_move_red_m() {
        let mut reg = ActionStateRegistry::default();
        register_default_catalog(&mut reg).unwrap();
        let move_ty = reg.lookup("Move").unwrap();
        assert_eq!(move_ty.icon, 'M');
        assert_eq!(move_ty.kind, ActionKind::Move);
        assert_eq!(move_ty.color, Color::srgb(0.85, 0.15, 0.15));
        // Every kind is resolvable back to its metadata.
        for kind in [
            ActionKind::Move,
            ActionKind::Scale,
            ActionKind::Mark,
            ActionKind::NewNode,
            ActionKind::EditNode,
            ActionKind::DeleteNode,
        ] {
            assert!(reg.for_kind(kind).is_some());
        }
    }
}
