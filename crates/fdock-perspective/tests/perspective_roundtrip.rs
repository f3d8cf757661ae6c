//! Perspectives through both formats, and interchange with the live tree.

use fdock_core::{DataInput, DataOutput, XElement};
use fdock_layout::{
    DockElement, DockSituation, MultipleDockable, MultipleDockableFactory, MultipleDockableLayout,
    Placement, SingleDockable, SingleDockableFactory, SingleDockableRegistry, SplitStation, Station,
    edge_path,
};
use fdock_perspective::{
    CPerspective, ExtendedMode, Location, MultipleDockablePerspective, PerspectiveConverter,
    PerspectiveElement, RootKind, RootStation, Setting, SingleDockablePerspective,
};
use fdock_split::Side;
use tracing_test::traced_test;

fn converter() -> PerspectiveConverter {
    let mut converter = PerspectiveConverter::new();
    converter.add_root("center", RootStation::new(RootKind::Split));
    converter.add_root("west", RootStation::new(RootKind::Flap));
    converter.add_root("external", RootStation::new(RootKind::Screen));
    converter.add_multiple_factory(MultipleDockableFactory::new("editor"));
    converter
}

fn editor(id: &str, title: &str) -> Box<dyn PerspectiveElement> {
    Box::new(MultipleDockablePerspective::new(
        "editor",
        MultipleDockableLayout {
            unique_id: id.into(),
            title: title.into(),
            ..MultipleDockableLayout::default()
        },
    ))
}

fn sample(converter: &PerspectiveConverter) -> CPerspective {
    let mut perspective = converter.create_empty_perspective();
    perspective
        .place(
            Box::new(SingleDockablePerspective::new("files")),
            ExtendedMode::Normalized,
            Location::new("center", None),
        )
        .unwrap();
    perspective
        .place(
            editor("e1", "main.rs"),
            ExtendedMode::Normalized,
            Location::new(
                "center",
                Some(Placement::Split { path: edge_path(Side::Right, 0.7) }),
            ),
        )
        .unwrap();
    perspective
        .place(
            Box::new(SingleDockablePerspective::new("console")),
            ExtendedMode::Minimized,
            Location::new("west", Some(Placement::Flap { index: 0, hold: true })),
        )
        .unwrap();
    perspective
}

#[test]
fn last_history_entry_decides_where_an_invisible_dockable_goes() {
    let mut converter = PerspectiveConverter::new();
    converter.add_root("A", RootStation::new(RootKind::Split));
    converter.add_root("B", RootStation::new(RootKind::Stack));
    let mut perspective = converter.create_empty_perspective();

    let loc1 = Location::new("A", Some(Placement::Split { path: edge_path(Side::Left, 0.3) }));
    let loc2 = Location::new("B", Some(Placement::Stack { index: 0 }));
    perspective
        .modes_mut()
        .record("X", ExtendedMode::Normalized, loc1);
    perspective
        .modes_mut()
        .record("X", ExtendedMode::Maximized, loc2.clone());

    let setting = converter.to_setting(&perspective, true).unwrap();
    assert_eq!(setting.invisible.len(), 1);
    assert_eq!(setting.invisible[0].key, "X");
    assert_eq!(setting.invisible_location("X"), Some(&loc2));
    assert_eq!(
        setting.modes.history("X").unwrap().order(),
        &[ExtendedMode::Normalized, ExtendedMode::Maximized]
    );
}

#[test]
fn perspective_survives_binary() {
    let converter = converter();
    let perspective = sample(&converter);

    let mut out = DataOutput::new(Vec::new());
    converter.write(&perspective, true, &mut out).unwrap();
    let bytes = out.into_inner();
    let read = converter.read(&mut DataInput::new(bytes.as_slice())).unwrap();

    assert_eq!(read.visible_keys(), perspective.visible_keys());
    assert_eq!(read.modes(), perspective.modes());
    assert_eq!(
        converter.to_setting(&read, true).unwrap(),
        converter.to_setting(&perspective, true).unwrap()
    );

    let mut again = DataOutput::new(Vec::new());
    converter.write(&read, true, &mut again).unwrap();
    assert_eq!(again.into_inner(), bytes);
}

#[test]
fn perspective_survives_xml() {
    let converter = converter();
    let perspective = sample(&converter);

    let mut root = XElement::new("perspective");
    converter.write_xml(&perspective, true, &mut root).unwrap();
    let text = root.to_xml_string().unwrap();
    let parsed = XElement::parse(&text).unwrap();
    assert!(parsed.element("stations").is_some());
    assert!(parsed.element("modes").is_some());

    let read = converter.read_xml(&parsed).unwrap();
    assert_eq!(read.location_of("console"), perspective.location_of("console"));
    assert_eq!(read.history("e1"), perspective.history("e1"));
    assert_eq!(
        converter.to_setting(&read, true).unwrap().roots,
        converter.to_setting(&perspective, true).unwrap().roots
    );
}

#[test]
fn missing_modes_element_is_an_error() {
    let converter = converter();
    let parsed = XElement::parse(r#"<perspective><stations version="1.1.1"/></perspective>"#).unwrap();
    assert!(converter.read_xml(&parsed).is_err());
}

#[traced_test]
#[test]
fn modes_are_applied_after_the_roots_exist() {
    let converter = converter();
    let mut perspective = sample(&converter);
    perspective
        .modes_mut()
        .record("files", ExtendedMode::Externalized, Location::new("east", None));

    let mut out = DataOutput::new(Vec::new());
    converter.write(&perspective, true, &mut out).unwrap();
    let bytes = out.into_inner();
    let read = converter.read(&mut DataInput::new(bytes.as_slice())).unwrap();

    let history = read.history("files").unwrap();
    assert_eq!(history.order(), &[ExtendedMode::Normalized]);
    assert!(logs_contain("location references unknown station; dropped"));
}

#[traced_test]
#[test]
fn unregistered_multiple_factory_only_loses_its_dockables() {
    let writer = converter();
    let perspective = sample(&writer);
    let mut out = DataOutput::new(Vec::new());
    writer.write(&perspective, true, &mut out).unwrap();
    let bytes = out.into_inner();

    let mut reader = PerspectiveConverter::new();
    reader.add_root("center", RootStation::new(RootKind::Split));
    reader.add_root("west", RootStation::new(RootKind::Flap));
    reader.add_root("external", RootStation::new(RootKind::Screen));
    let read = reader.read(&mut DataInput::new(bytes.as_slice())).unwrap();

    assert!(read.contains_dockable("files"));
    assert!(read.contains_dockable("console"));
    assert!(!read.contains_dockable("e1"));
    assert!(logs_contain("unknown factory; payload skipped"));
}

#[test]
fn live_layouts_read_into_perspectives_and_back_byte_for_byte() {
    let registry = SingleDockableRegistry::new();
    registry.register("files", "Files");
    let mut live = DockSituation::<dyn DockElement>::with_defaults();
    live.add(SingleDockableFactory::new(registry))
        .add(MultipleDockableFactory::new("editor"));

    let mut center: SplitStation<dyn DockElement> = SplitStation::new();
    center.add(Box::new(SingleDockable::new("files", "Files")), None).unwrap();
    center
        .add(
            Box::new(MultipleDockable::new("editor", "e1", "main.rs").with_property("line", "7")),
            Some(&Placement::Split { path: edge_path(Side::Bottom, 0.4) }),
        )
        .unwrap();

    let setting = Setting {
        roots: live.convert_roots([("center", &center as &dyn DockElement)]).unwrap(),
        ..Setting::default()
    };
    let mut out = DataOutput::new(Vec::new());
    setting.write(&live, &mut out).unwrap();
    let live_bytes = out.into_inner();

    let converter = converter();
    let read = Setting::read(converter.situation(), &mut DataInput::new(live_bytes.as_slice())).unwrap();
    let perspective = converter.from_setting(&read).unwrap();
    assert!(perspective.contains_dockable("files"));
    let e1 = perspective.dockable("e1").unwrap();
    let e1 = PerspectiveElement::as_any(e1)
        .downcast_ref::<MultipleDockablePerspective>()
        .unwrap();
    assert_eq!(e1.layout().properties.get("line").map(String::as_str), Some("7"));

    let mut back = converter.to_setting(&perspective, true).unwrap();
    back.roots.retain(|key, _| key == "center");
    let mut out = DataOutput::new(Vec::new());
    back.write(converter.situation(), &mut out).unwrap();
    assert_eq!(out.into_inner(), live_bytes);
}
