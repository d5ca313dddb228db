use super::access_profile::ScreenPermissionState;
use super::catalog::{PermissionCatalog, Screen};
use super::permission::PermissionType;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Enabled-permission state of one profile under edit.
///
/// Screens absent from the mapping have nothing enabled. Every stored set is a
/// non-empty subset of the screen's available permissions. The "fully selected"
/// flags are never stored; they are recomputed against the catalog on every call.
#[derive(Clone, Debug)]
pub struct PermissionMatrix {
    catalog: Arc<PermissionCatalog>,
    enabled: HashMap<String, BTreeSet<PermissionType>>,
}

impl PermissionMatrix {
    /// Creates an empty matrix over the given catalog.
    pub fn new(catalog: Arc<PermissionCatalog>) -> Self {
        Self {
            catalog,
            enabled: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Replaces the whole state with the persisted permissions of a profile.
    ///
    /// Unknown screens and permissions a screen does not offer are dropped.
    pub fn initialize(&mut self, states: &[ScreenPermissionState]) {
        self.enabled.clear();
        for state in states {
            let Some(screen) = self.catalog.find_screen(&state.screen_id) else {
                tracing::warn!(screen_id = %state.screen_id, "Dropping permissions of unknown screen");
                continue;
            };
            let mut set = BTreeSet::new();
            for permission in &state.permissions {
                if screen.supports(*permission) {
                    set.insert(*permission);
                } else {
                    tracing::warn!(
                        screen_id = %screen.id,
                        permission = %permission,
                        "Dropping permission not available on screen"
                    );
                }
            }
            if !set.is_empty() {
                self.enabled.entry(screen.id.clone()).or_default().extend(set);
            }
        }
    }

    /// Flips one permission of one screen. Unavailable combinations are ignored.
    pub fn toggle_permission(&mut self, screen_id: &str, permission: PermissionType) {
        let Some(screen) = self.catalog.find_screen(screen_id) else {
            return;
        };
        if !screen.supports(permission) {
            return;
        }
        let set = self.enabled.entry(screen.id.clone()).or_default();
        if !set.remove(&permission) {
            set.insert(permission);
        }
        if set.is_empty() {
            self.enabled.remove(screen_id);
        }
    }

    /// Full screen becomes empty, anything else becomes full.
    pub fn toggle_screen(&mut self, screen_id: &str) {
        let catalog = Arc::clone(&self.catalog);
        let Some(screen) = catalog.find_screen(screen_id) else {
            return;
        };
        if screen.available_permissions.is_empty() {
            return;
        }
        let fill = !self.is_screen_fully_selected(screen_id);
        self.set_screen(screen, fill);
    }

    /// Clears the module if every one of its screens is full, fills it otherwise.
    pub fn toggle_module(&mut self, module: &str) {
        let catalog = Arc::clone(&self.catalog);
        let fill = !self.is_module_fully_selected(module);
        for screen in catalog.screens_in_module(module) {
            self.set_screen(screen, fill);
        }
    }

    /// Same rollup as [`toggle_module`](Self::toggle_module) over the whole catalog.
    pub fn toggle_all(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let fill = !self.is_all_selected();
        for screen in catalog.list_screens() {
            self.set_screen(screen, fill);
        }
    }

    pub fn is_enabled(&self, screen_id: &str, permission: PermissionType) -> bool {
        self.enabled
            .get(screen_id)
            .is_some_and(|set| set.contains(&permission))
    }

    pub fn is_screen_fully_selected(&self, screen_id: &str) -> bool {
        self.catalog
            .find_screen(screen_id)
            .is_some_and(|screen| self.screen_is_full(screen))
    }

    /// True iff the module has at least one selectable screen and all of them are full.
    pub fn is_module_fully_selected(&self, module: &str) -> bool {
        self.all_full(self.catalog.screens_in_module(module))
    }

    /// True when every selectable screen is full. Modules without selectable
    /// screens do not take part.
    pub fn is_all_selected(&self) -> bool {
        self.all_full(self.catalog.list_screens().iter())
    }

    /// Returns `(enabled, total)` over the whole catalog.
    pub fn count_enabled(&self) -> (usize, usize) {
        let enabled = self.enabled.values().map(BTreeSet::len).sum();
        (enabled, self.catalog.total_permissions())
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Serializes the state into the persisted shape.
    ///
    /// Screens follow catalog order and permissions follow each screen's
    /// available order, so two calls without mutation in between are equal.
    pub fn export_state(&self) -> Vec<ScreenPermissionState> {
        self.catalog
            .list_screens()
            .iter()
            .filter_map(|screen| {
                let set = self.enabled.get(&screen.id)?;
                let permissions: Vec<PermissionType> = screen
                    .available_permissions
                    .iter()
                    .copied()
                    .filter(|p| set.contains(p))
                    .collect();
                (!permissions.is_empty())
                    .then(|| ScreenPermissionState::new(&screen.id, permissions))
            })
            .collect()
    }

    fn screen_is_full(&self, screen: &Screen) -> bool {
        !screen.available_permissions.is_empty()
            && self
                .enabled
                .get(&screen.id)
                .is_some_and(|set| set.len() == screen.available_permissions.len())
    }

    fn all_full<'a>(&self, screens: impl Iterator<Item = &'a Screen>) -> bool {
        let mut selectable = screens
            .filter(|s| !s.available_permissions.is_empty())
            .peekable();
        selectable.peek().is_some() && selectable.all(|s| self.screen_is_full(s))
    }

    fn set_screen(&mut self, screen: &Screen, fill: bool) {
        if fill && !screen.available_permissions.is_empty() {
            self.enabled.insert(
                screen.id.clone(),
                screen.available_permissions.iter().copied().collect(),
            );
        } else {
            self.enabled.remove(&screen.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Module;
    use PermissionType::*;

    fn test_catalog() -> Arc<PermissionCatalog> {
        Arc::new(PermissionCatalog::new(
            vec![
                Module::new("escritorio", "Escritório"),
                Module::new("sistema", "Sistema"),
                Module::new("vazio", "Vazio"),
            ],
            vec![
                Screen::new(
                    "processos",
                    "Processos",
                    "escritorio",
                    &[View, Create, Edit, Delete, Export],
                ),
                Screen::new("relatorio", "Relatório", "escritorio", &[View, Export]),
                Screen::new("usuarios", "Usuários", "sistema", &[View, Create, Edit, Delete]),
            ],
        ))
    }

    fn enabled_of(matrix: &PermissionMatrix, screen_id: &str) -> Vec<PermissionType> {
        matrix
            .export_state()
            .into_iter()
            .find(|s| s.screen_id == screen_id)
            .map(|s| s.permissions)
            .unwrap_or_default()
    }

    #[test]
    fn test_toggle_permission_flips_and_removes_empty_entries() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_permission("processos", View);
        assert!(matrix.is_enabled("processos", View));
        assert_eq!(matrix.export_state().len(), 1);

        matrix.toggle_permission("processos", View);
        assert!(!matrix.is_enabled("processos", View));
        assert!(matrix.is_empty());
        assert!(matrix.export_state().is_empty());
    }

    #[test]
    fn test_toggle_permission_ignores_unavailable_combinations() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_permission("relatorio", Delete);
        matrix.toggle_permission("processos", EditConfidential);
        matrix.toggle_permission("inexistente", View);
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_toggle_screen_on_partially_selected_screen() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.initialize(&[ScreenPermissionState::new("processos", vec![View, Edit])]);
        assert!(!matrix.is_screen_fully_selected("processos"));

        matrix.toggle_screen("processos");
        assert_eq!(
            enabled_of(&matrix, "processos"),
            vec![View, Create, Edit, Delete, Export]
        );
        assert!(matrix.is_screen_fully_selected("processos"));

        matrix.toggle_screen("processos");
        assert!(enabled_of(&matrix, "processos").is_empty());
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_toggle_module_rollup() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        // A fully selected screen alone does not make the module full.
        matrix.toggle_screen("relatorio");
        assert!(!matrix.is_module_fully_selected("escritorio"));

        matrix.toggle_module("escritorio");
        assert!(matrix.is_module_fully_selected("escritorio"));
        assert!(matrix.is_screen_fully_selected("processos"));
        assert!(!matrix.is_module_fully_selected("sistema"));

        matrix.toggle_module("escritorio");
        assert!(!matrix.is_module_fully_selected("escritorio"));
        assert!(enabled_of(&matrix, "processos").is_empty());
        assert!(enabled_of(&matrix, "relatorio").is_empty());
    }

    #[test]
    fn test_empty_module_is_never_fully_selected() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        assert!(!matrix.is_module_fully_selected("vazio"));
        matrix.toggle_module("vazio");
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_toggle_all_fills_then_clears() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_permission("usuarios", View);
        assert!(!matrix.is_all_selected());

        matrix.toggle_all();
        assert!(matrix.is_all_selected());
        assert!(matrix.is_module_fully_selected("escritorio"));
        assert!(matrix.is_module_fully_selected("sistema"));
        assert_eq!(matrix.count_enabled(), (11, 11));

        matrix.toggle_all();
        assert!(!matrix.is_all_selected());
        assert_eq!(matrix.count_enabled(), (0, 11));
    }

    #[test]
    fn test_initialize_drops_invalid_entries() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_all();
        matrix.initialize(&[
            ScreenPermissionState::new("relatorio", vec![Export, Delete]),
            ScreenPermissionState::new("fantasma", vec![View]),
            ScreenPermissionState::new("usuarios", vec![]),
        ]);
        assert_eq!(
            matrix.export_state(),
            vec![ScreenPermissionState::new("relatorio", vec![Export])]
        );
        assert_eq!(matrix.count_enabled(), (1, 11));
    }

    #[test]
    fn test_export_state_is_ordered_and_idempotent() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_permission("usuarios", Delete);
        matrix.toggle_permission("processos", Export);
        matrix.toggle_permission("processos", View);

        let first = matrix.export_state();
        let second = matrix.export_state();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                ScreenPermissionState::new("processos", vec![View, Export]),
                ScreenPermissionState::new("usuarios", vec![Delete]),
            ]
        );
    }

    #[test]
    fn test_subset_invariant_holds_after_bulk_operations() {
        let catalog = test_catalog();
        let mut matrix = PermissionMatrix::new(catalog.clone());
        matrix.toggle_all();
        matrix.toggle_module("sistema");
        matrix.toggle_permission("relatorio", View);
        matrix.toggle_screen("usuarios");

        for state in matrix.export_state() {
            let screen = catalog.find_screen(&state.screen_id).unwrap();
            assert!(!state.permissions.is_empty());
            assert!(state.permissions.iter().all(|p| screen.supports(*p)));
        }
    }

    #[test]
    fn test_rollups_follow_catalog_membership() {
        let mut matrix = PermissionMatrix::new(test_catalog());
        matrix.toggle_module("sistema");
        assert!(matrix.is_module_fully_selected("sistema"));

        // Same persisted state loaded against a catalog with an extra screen.
        let mut screens = test_catalog().list_screens().to_vec();
        screens.push(Screen::new("auditoria", "Auditoria", "sistema", &[View]));
        let grown = Arc::new(PermissionCatalog::new(
            test_catalog().list_modules().to_vec(),
            screens,
        ));
        let mut reloaded = PermissionMatrix::new(grown);
        reloaded.initialize(&matrix.export_state());
        assert!(!reloaded.is_module_fully_selected("sistema"));

        reloaded.toggle_module("sistema");
        assert!(reloaded.is_screen_fully_selected("auditoria"));
    }
}
