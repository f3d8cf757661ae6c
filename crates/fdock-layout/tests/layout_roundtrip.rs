//! End-to-end conversion and codec scenarios over the live element tree.

use std::collections::BTreeMap;

use fdock_core::{DataInput, DataOutput, Insets, XElement};
use fdock_layout::{
    CodecLimits, DefaultDockable, DockElement, DockLayoutComposition, DockSituation, LayoutError,
    Placement, STACK_FACTORY_ID, SituationIgnore, SplitStation, StackStation, Station, edge_path,
};
use fdock_split::Side;
use tracing_test::traced_test;

fn leaf(title: &str) -> Box<dyn DockElement> {
    Box::new(DefaultDockable::new(title))
}

/// `split[ stack[a, b] | c ]`: five nodes, three levels.
fn sample_tree() -> SplitStation<dyn DockElement> {
    let mut stack: StackStation<dyn DockElement> = StackStation::new();
    stack.add(leaf("a"), None).unwrap();
    stack.add(leaf("b"), None).unwrap();

    let mut split: SplitStation<dyn DockElement> = SplitStation::new();
    split.add(Box::new(stack), None).unwrap();
    split
        .add(leaf("c"), Some(&Placement::Split { path: edge_path(Side::Right, 0.25) }))
        .unwrap();
    split
}

fn titles(element: &dyn DockElement) -> Vec<String> {
    match element.as_station() {
        Some(station) => (0..station.dockable_count())
            .filter_map(|index| station.dockable(index))
            .flat_map(titles)
            .collect(),
        None => element
            .as_dockable()
            .map(|d| vec![d.title().to_owned()])
            .unwrap_or_default(),
    }
}

fn to_bytes(situation: &DockSituation<dyn DockElement>, composition: &DockLayoutComposition) -> Vec<u8> {
    let mut out = DataOutput::new(Vec::new());
    situation.write_composition(composition, &mut out).unwrap();
    out.into_inner()
}

fn from_bytes(situation: &DockSituation<dyn DockElement>, bytes: &[u8]) -> DockLayoutComposition {
    situation
        .read_composition(&mut DataInput::new(bytes))
        .unwrap()
}

#[test]
fn five_node_tree_survives_binary() {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let composition = situation.convert(&sample_tree()).unwrap().unwrap();
    assert_eq!(composition.node_count(), 5);

    let read = from_bytes(&situation, &to_bytes(&situation, &composition));
    assert_eq!(read.node_count(), 5);
    assert_eq!(
        read.factory_ids(),
        vec![
            "SplitDockStationFactory",
            "StackDockStationFactory",
            "DefaultDockableFactory",
            "DefaultDockableFactory",
            "DefaultDockableFactory",
        ]
    );
    assert_eq!(read, composition);
}

#[test]
fn rebuilt_tree_converts_to_the_same_composition() {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let composition = situation.convert(&sample_tree()).unwrap().unwrap();
    let read = from_bytes(&situation, &to_bytes(&situation, &composition));

    let rebuilt = situation.build(&read).unwrap().unwrap();
    assert_eq!(titles(rebuilt.as_ref()), vec!["a", "b", "c"]);
    let again = situation.convert(rebuilt.as_ref()).unwrap().unwrap();
    assert_eq!(again, composition);
}

#[test]
fn rebuilt_split_keeps_geometry() {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let composition = situation.convert(&sample_tree()).unwrap().unwrap();
    let mut rebuilt = situation.build(&composition).unwrap().unwrap();

    let split = rebuilt
        .as_any_mut()
        .downcast_mut::<SplitStation<dyn DockElement>>()
        .unwrap();
    split.compute_bounds(400, 100, Insets::default());
    let handles: Vec<_> = split.tree().dockables().into_iter().copied().collect();
    let stack_bounds = split.tree().leaf_bounds(&handles[0]).unwrap();
    let c_bounds = split.tree().leaf_bounds(&handles[1]).unwrap();
    assert_eq!((stack_bounds.x, stack_bounds.width), (0, 300));
    assert_eq!((c_bounds.x, c_bounds.width), (300, 100));
}

#[test]
fn writing_twice_is_byte_identical() {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let composition = situation.convert(&sample_tree()).unwrap().unwrap();
    assert_eq!(
        to_bytes(&situation, &composition),
        to_bytes(&situation, &composition)
    );
}

#[traced_test]
#[test]
fn missing_interior_factory_only_loses_its_subtree() {
    let writer = DockSituation::<dyn DockElement>::with_defaults();
    let bytes = to_bytes(&writer, &writer.convert(&sample_tree()).unwrap().unwrap());

    let mut reader = DockSituation::<dyn DockElement>::with_defaults();
    reader.remove(STACK_FACTORY_ID);
    let read = from_bytes(&reader, &bytes);
    assert_eq!(read.node_count(), 5);
    assert!(read.children[0].layout.is_none());
    assert!(read.children[0].children.iter().all(|c| c.layout.is_some()));
    assert!(logs_contain("unknown factory; payload skipped"));

    let rebuilt = reader.build(&read).unwrap().unwrap();
    assert_eq!(titles(rebuilt.as_ref()), vec!["c"]);
}

#[traced_test]
#[test]
fn non_dockable_child_is_dropped_with_warning() {
    let mut situation = DockSituation::<dyn DockElement>::with_defaults();
    situation.add(fdock_layout::ScreenStationFactory);
    let screen = fdock_layout::ScreenStation::<dyn DockElement>::new();

    let mut composition = situation.convert(&sample_tree()).unwrap().unwrap();
    composition.children[0]
        .children
        .push(situation.convert(&screen).unwrap().unwrap());
    let rebuilt = situation.build(&composition).unwrap().unwrap();
    assert_eq!(titles(rebuilt.as_ref()), vec!["a", "b", "c"]);
    assert!(logs_contain("child is not dockable; dropped"));
}

struct IgnoreStackChildren;

impl SituationIgnore<dyn DockElement> for IgnoreStackChildren {
    fn ignore_children(&self, station: &dyn DockElement) -> bool {
        station.factory_id() == STACK_FACTORY_ID
    }
}

#[test]
fn ignored_children_flag_survives_xml() {
    let mut situation = DockSituation::<dyn DockElement>::with_defaults();
    situation.set_ignore(Some(Box::new(IgnoreStackChildren)));
    let tree = sample_tree();

    let mut stations = XElement::new("stations");
    situation.write_xml([("center", &tree as &dyn DockElement)], &mut stations).unwrap();
    let text = stations.to_xml_string().unwrap();
    assert!(text.contains(r#"ignore="true""#));

    let parsed = XElement::parse(&text).unwrap();
    let compositions = situation.read_compositions_xml(&parsed).unwrap();
    let center = &compositions["center"];
    assert!(center.children[0].ignore_children);
    assert!(center.children[0].children.is_empty());

    let roots = situation.read_xml(&parsed).unwrap();
    assert_eq!(titles(roots["center"].as_ref()), vec!["c"]);
}

#[test]
fn container_drops_roots_that_are_not_stations() {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let tree = sample_tree();
    let loose = DefaultDockable::new("loose");

    let mut out = DataOutput::new(Vec::new());
    situation
        .write(
            [
                ("center", &tree as &dyn DockElement),
                ("loose", &loose as &dyn DockElement),
            ],
            &mut out,
        )
        .unwrap();
    let bytes = out.into_inner();

    let compositions = situation
        .read_compositions(&mut DataInput::new(bytes.as_slice()))
        .unwrap();
    assert_eq!(compositions.len(), 2);
    let roots = situation.read(&mut DataInput::new(bytes.as_slice())).unwrap();
    assert_eq!(roots.keys().collect::<Vec<_>>(), vec!["center"]);
}

#[test]
fn missing_factory_on_write_is_an_error() {
    let situation = DockSituation::<dyn DockElement>::with_stations();
    let err = situation.convert(&sample_tree()).unwrap_err();
    assert!(matches!(err, LayoutError::MissingFactory(_)));

    let empty: BTreeMap<String, DockLayoutComposition> = BTreeMap::new();
    let mut out = DataOutput::new(Vec::new());
    situation.write_compositions(&empty, &mut out).unwrap();
    assert_eq!(out.into_inner(), vec![1, 1, 0, 1, 0, 0, 0, 0]);
}

#[test]
fn limits_load_from_partial_json() {
    let limits: CodecLimits = serde_json::from_str(r#"{ "max_depth": 8 }"#).unwrap();
    assert_eq!(limits.max_depth, 8);
    assert_eq!(limits.max_payload_len, CodecLimits::default().max_payload_len);
    assert!(limits.strict_versions);
}
