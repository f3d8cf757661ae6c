//! Factory registry and the element ↔ composition converter.
//!
//! A [`DockSituation`] owns every factory of one element hierarchy, keyed by
//! factory id. Converting down ([`DockSituation::convert`]) walks a live tree
//! pre-order and asks each element's factory for its layout; converting up
//! ([`DockSituation::build`]) rebuilds children first and hands them to the
//! parent's factory. The codecs in [`crate::codec`] are methods on the same
//! type, since reading a payload needs the factory that wrote it.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::composition::{ChildIds, ChildMap, DockLayoutComposition};
use crate::dockable::DefaultDockableFactory;
use crate::element::{DockElement, ElementTree, LayoutNode};
use crate::error::LayoutError;
use crate::factory::{DockFactory, ErasedFactory};
use crate::station::{FlapStationFactory, SplitStationFactory, StackStationFactory};

/// Default cap on a single binary payload.
pub const DEFAULT_MAX_PAYLOAD_LEN: u32 = 16 * 1024 * 1024;

/// Default cap on composition nesting when reading.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Bounds applied by the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Largest payload the binary reader reads or skips.
    pub max_payload_len: u32,
    /// Deepest composition nesting accepted.
    pub max_depth: usize,
    /// Require the exact format version; otherwise any version with the same
    /// major number is read.
    pub strict_versions: bool,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_versions: true,
        }
    }
}

/// Filter applied while converting elements down to compositions.
pub trait SituationIgnore<E: ?Sized> {
    /// Leave `element` and its subtree out entirely.
    fn ignore_element(&self, _element: &E) -> bool {
        false
    }

    /// Keep `station` but none of its children.
    fn ignore_children(&self, _station: &E) -> bool {
        false
    }
}

pub struct DockSituation<E: ?Sized> {
    pub(crate) factories: FxHashMap<String, Box<dyn ErasedFactory<E>>>,
    ignore: Option<Box<dyn SituationIgnore<E>>>,
    pub(crate) limits: CodecLimits,
}

impl<E: ?Sized> fmt::Debug for DockSituation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockSituation")
            .field("factories", &self.factory_ids())
            .field("ignore", &self.ignore.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}

impl<E: ?Sized> Default for DockSituation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> DockSituation<E> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
            ignore: None,
            limits: CodecLimits::default(),
        }
    }

    /// Register `factory` under its id, replacing any earlier factory with
    /// the same id.
    pub fn add<F: DockFactory<E>>(&mut self, factory: F) -> &mut Self {
        self.add_boxed(Box::new(factory))
    }

    pub fn add_boxed(&mut self, factory: Box<dyn ErasedFactory<E>>) -> &mut Self {
        let id = factory.id().to_owned();
        if self.factories.insert(id.clone(), factory).is_some() {
            tracing::debug!(target: "fdock.layout", factory = %id, "factory replaced");
        }
        self
    }

    /// Unregister the factory with `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        self.factories.remove(id).is_some()
    }

    #[must_use]
    pub fn factory(&self, id: &str) -> Option<&dyn ErasedFactory<E>> {
        self.factories.get(id).map(|factory| &**factory)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn factory_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn set_ignore(&mut self, ignore: Option<Box<dyn SituationIgnore<E>>>) {
        self.ignore = ignore;
    }

    #[must_use]
    pub const fn limits(&self) -> CodecLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: CodecLimits) {
        self.limits = limits;
    }
}

impl<E: ElementTree + ?Sized> DockSituation<E> {
    /// A registry with the split, stack and flap station factories,
    /// including their secure variants.
    #[must_use]
    pub fn with_stations() -> Self {
        let mut situation = Self::new();
        situation
            .add(SplitStationFactory::new())
            .add(SplitStationFactory::secure())
            .add(StackStationFactory::new())
            .add(StackStationFactory::secure())
            .add(FlapStationFactory::new())
            .add(FlapStationFactory::secure());
        situation
    }
}

impl DockSituation<dyn DockElement> {
    /// Stock stations plus the default dockable.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut situation = Self::with_stations();
        situation.add(DefaultDockableFactory);
        situation
    }
}

impl<E: LayoutNode + ?Sized> DockSituation<E> {
    /// Convert `element` and its subtree into a composition, applying the
    /// registered ignore filter. `Ok(None)` means the element was ignored.
    pub fn convert(&self, element: &E) -> Result<Option<DockLayoutComposition>, LayoutError> {
        self.convert_with(element, self.ignore.as_deref())
    }

    /// Like [`DockSituation::convert`] with an explicit filter.
    pub fn convert_with(
        &self,
        element: &E,
        ignore: Option<&dyn SituationIgnore<E>>,
    ) -> Result<Option<DockLayoutComposition>, LayoutError> {
        let _span = tracing::debug_span!(
            target: "fdock.layout",
            "layout.convert",
            factory = %element.factory_id()
        )
        .entered();
        let composition = self.convert_node(element, ignore)?;
        if let Some(composition) = &composition {
            tracing::debug!(
                target: "fdock.layout",
                nodes = composition.node_count(),
                "converted element"
            );
        }
        Ok(composition)
    }

    fn convert_node(
        &self,
        element: &E,
        ignore: Option<&dyn SituationIgnore<E>>,
    ) -> Result<Option<DockLayoutComposition>, LayoutError> {
        if ignore.is_some_and(|filter| filter.ignore_element(element)) {
            return Ok(None);
        }
        let id = element.factory_id();
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| LayoutError::MissingFactory(id.to_owned()))?;

        let mut children = Vec::new();
        let mut ids = ChildIds::new();
        let mut ignore_children = false;
        if let Some(station) = element.station() {
            ignore_children = ignore.is_some_and(|filter| filter.ignore_children(element));
            if !ignore_children {
                for index in 0..station.dockable_count() {
                    let converted = match station.dockable(index) {
                        Some(child) => self.convert_node(child, ignore)?,
                        None => None,
                    };
                    match converted {
                        Some(composition) => {
                            ids.push(Some(children.len()));
                            children.push(composition);
                        }
                        None => ids.push(None),
                    }
                }
            }
        }

        let layout = factory.layout_of(element, &ids)?;
        Ok(Some(DockLayoutComposition::new(
            layout,
            children,
            ignore_children,
        )))
    }

    /// Rebuild an element from `composition`, children first.
    ///
    /// A node without layout (its factory was unknown when it was read)
    /// yields `Ok(None)`; so does a factory that declines to build. Rebuilt
    /// children that are not dockable are dropped.
    pub fn build(
        &self,
        composition: &DockLayoutComposition,
    ) -> Result<Option<Box<E>>, LayoutError> {
        let Some(layout) = &composition.layout else {
            tracing::warn!(
                target: "fdock.layout",
                factory = %composition.factory_id,
                "no layout for node; skipped"
            );
            return Ok(None);
        };
        let Some(factory) = self.factories.get(&composition.factory_id) else {
            tracing::warn!(
                target: "fdock.layout",
                factory = %composition.factory_id,
                "factory not registered; node skipped"
            );
            return Ok(None);
        };

        if composition.ignore_children {
            for child in &composition.children {
                self.build(child)?;
            }
            return factory.layout(layout, None);
        }

        let mut children = ChildMap::new();
        for (id, child) in composition.children.iter().enumerate() {
            match self.build(child)? {
                Some(element) if element.is_dockable() => children.insert(id, element),
                Some(element) => tracing::warn!(
                    target: "fdock.layout",
                    child = %element.factory_id(),
                    parent = %composition.factory_id,
                    "child is not dockable; dropped"
                ),
                None => {}
            }
        }
        factory.layout(layout, Some(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockable::{DefaultDockable, DEFAULT_DOCKABLE_FACTORY_ID};
    use crate::element::{Dockable, Station};
    use crate::station::{
        SPLIT_FACTORY_ID, STACK_FACTORY_ID, ScreenStation, ScreenStationFactory, StackStation,
    };

    fn titles(element: &dyn DockElement) -> Vec<String> {
        let Some(station) = element.as_station() else {
            return vec![element.as_dockable().map(|d| d.title().to_owned()).unwrap_or_default()];
        };
        (0..station.dockable_count())
            .filter_map(|index| station.dockable(index))
            .flat_map(titles)
            .collect()
    }

    fn stack_of(names: &[&str]) -> StackStation<dyn DockElement> {
        let mut stack: StackStation<dyn DockElement> = StackStation::new();
        for name in names {
            stack.add(Box::new(DefaultDockable::new(*name)), None).unwrap();
        }
        stack
    }

    struct SkipTitled(&'static str);

    impl SituationIgnore<dyn DockElement> for SkipTitled {
        fn ignore_element(&self, element: &dyn DockElement) -> bool {
            element.as_dockable().is_some_and(|d| d.title() == self.0)
        }
    }

    struct KeepStacksEmpty;

    impl SituationIgnore<dyn DockElement> for KeepStacksEmpty {
        fn ignore_children(&self, station: &dyn DockElement) -> bool {
            station.factory_id() == STACK_FACTORY_ID
        }
    }

    #[test]
    fn defaults_cover_stock_factories() {
        let situation = DockSituation::<dyn DockElement>::with_defaults();
        assert_eq!(situation.factory_ids().len(), 7);
        assert!(situation.contains(DEFAULT_DOCKABLE_FACTORY_ID));
        assert!(situation.contains(SPLIT_FACTORY_ID));
        assert!(!situation.contains("ScreenDockStationFactory"));
    }

    #[test]
    fn later_registration_wins() {
        let mut situation = DockSituation::<dyn DockElement>::new();
        situation.add(StackStationFactory::new());
        situation.add(StackStationFactory::new());
        assert_eq!(situation.factory_ids(), vec![STACK_FACTORY_ID]);
        assert!(situation.remove(STACK_FACTORY_ID));
        assert!(situation.factory(STACK_FACTORY_ID).is_none());
    }

    #[test]
    fn convert_then_build_restores_order() {
        let situation = DockSituation::<dyn DockElement>::with_defaults();
        let stack = stack_of(&["a", "b", "c"]);
        let composition = situation.convert(&stack).unwrap().unwrap();
        assert_eq!(composition.node_count(), 4);
        let rebuilt = situation.build(&composition).unwrap().unwrap();
        assert_eq!(titles(rebuilt.as_ref()), vec!["a", "b", "c"]);
    }

    #[test]
    fn ignored_children_get_dense_ids() {
        let mut situation = DockSituation::<dyn DockElement>::with_defaults();
        situation.set_ignore(Some(Box::new(SkipTitled("b"))));
        let composition = situation.convert(&stack_of(&["a", "b", "c"])).unwrap().unwrap();
        assert_eq!(composition.children.len(), 2);
        let layout = composition
            .layout
            .as_ref()
            .and_then(|layout| layout.downcast_ref::<crate::station::StackLayout>())
            .unwrap();
        assert_eq!(layout.ids, vec![0, 1]);
        let rebuilt = situation.build(&composition).unwrap().unwrap();
        assert_eq!(titles(rebuilt.as_ref()), vec!["a", "c"]);
    }

    #[test]
    fn ignore_children_keeps_station_only() {
        let situation = DockSituation::<dyn DockElement>::with_defaults();
        let composition = situation
            .convert_with(&stack_of(&["a", "b"]), Some(&KeepStacksEmpty))
            .unwrap()
            .unwrap();
        assert!(composition.ignore_children);
        assert!(composition.children.is_empty());
        let rebuilt = situation.build(&composition).unwrap().unwrap();
        assert_eq!(rebuilt.as_station().unwrap().dockable_count(), 0);
    }

    #[test]
    fn missing_factory_fails_conversion() {
        let situation = DockSituation::<dyn DockElement>::with_stations();
        let err = situation.convert(&stack_of(&["a"])).unwrap_err();
        assert!(matches!(err, LayoutError::MissingFactory(id) if id == DEFAULT_DOCKABLE_FACTORY_ID));
    }

    #[test]
    fn unresolved_nodes_build_to_nothing() {
        let situation = DockSituation::<dyn DockElement>::with_defaults();
        let mut composition = situation.convert(&stack_of(&["a", "b"])).unwrap().unwrap();
        composition.children[0] =
            DockLayoutComposition::unresolved("PluginDockableFactory", vec![], false);
        let rebuilt = situation.build(&composition).unwrap().unwrap();
        assert_eq!(titles(rebuilt.as_ref()), vec!["b"]);
    }

    #[test]
    fn non_dockable_children_are_dropped() {
        let mut situation = DockSituation::<dyn DockElement>::with_defaults();
        situation.add(ScreenStationFactory);
        let screen: ScreenStation<dyn DockElement> = ScreenStation::new();
        let screen_composition = situation.convert(&screen).unwrap().unwrap();
        let mut composition = situation.convert(&stack_of(&["a"])).unwrap().unwrap();
        composition.children.push(screen_composition);
        let rebuilt = situation.build(&composition).unwrap().unwrap();
        assert_eq!(rebuilt.as_station().unwrap().dockable_count(), 1);
    }
}
