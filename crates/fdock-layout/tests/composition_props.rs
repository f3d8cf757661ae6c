//! Property checks over randomly shaped live trees.
//!
//! Trees are grown from a seed: stations (split, stack, flap, secure
//! variants) nest up to a few levels deep with titled dockables at the
//! leaves. For every tree, the binary and XML encodings must read back to
//! the same composition, rebuilding must reproduce the same composition, and
//! writing must be deterministic.

use fdock_core::{DataInput, DataOutput, XElement};
use fdock_layout::{
    DefaultDockable, DockElement, DockLayoutComposition, DockSituation, FlapStation, Placement,
    SplitStation, StackStation, Station,
};
use fdock_split::{Side, SplitPath};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0xD1B5_4A32_D192_ED03,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 11
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn coin(&mut self) -> bool {
        self.below(2) == 0
    }
}

fn grow(rng: &mut Lcg, depth: usize, counter: &mut usize) -> Box<dyn DockElement> {
    if depth == 0 || rng.below(3) == 0 {
        *counter += 1;
        return Box::new(DefaultDockable::new(format!("d{counter}")));
    }
    let children = 1 + rng.below(3) as usize;
    match rng.below(3) {
        0 => {
            let mut split: SplitStation<dyn DockElement> = if rng.coin() {
                SplitStation::new()
            } else {
                SplitStation::secure()
            };
            for _ in 0..children {
                let side = [Side::Left, Side::Right, Side::Top, Side::Bottom][rng.below(4) as usize];
                let size = 0.1 + rng.below(80) as f64 / 100.0;
                let path = SplitPath::new().with_step(side, size);
                let child = grow(rng, depth - 1, counter);
                split.add(child, Some(&Placement::Split { path })).unwrap();
            }
            Box::new(split)
        }
        1 => {
            let mut stack: StackStation<dyn DockElement> = if rng.coin() {
                StackStation::new()
            } else {
                StackStation::secure()
            };
            for _ in 0..children {
                let child = grow(rng, depth - 1, counter);
                stack.add(child, None).unwrap();
            }
            Box::new(stack)
        }
        _ => {
            let mut flap: FlapStation<dyn DockElement> = FlapStation::new();
            flap.set_auto(rng.coin());
            for index in 0..children {
                let child = grow(rng, depth - 1, counter);
                let hold = rng.coin();
                flap.add(child, Some(&Placement::Flap { index, hold })).unwrap();
            }
            Box::new(flap)
        }
    }
}

fn encode(situation: &DockSituation<dyn DockElement>, composition: &DockLayoutComposition) -> Vec<u8> {
    let mut out = DataOutput::new(Vec::new());
    situation.write_composition(composition, &mut out).unwrap();
    out.into_inner()
}

fn check_tree(seed: u64) {
    let situation = DockSituation::<dyn DockElement>::with_defaults();
    let mut rng = Lcg::new(seed);
    let mut counter = 0;
    let tree = grow(&mut rng, 4, &mut counter);
    let composition = situation.convert(tree.as_ref()).unwrap().unwrap();

    let bytes = encode(&situation, &composition);
    assert_eq!(bytes, encode(&situation, &composition), "seed {seed}");
    let read = situation
        .read_composition(&mut DataInput::new(bytes.as_slice()))
        .unwrap();
    assert_eq!(read, composition, "binary, seed {seed}");

    let mut element = XElement::new("element");
    situation.write_composition_xml(&composition, &mut element).unwrap();
    let parsed = XElement::parse(&element.to_xml_string().unwrap()).unwrap();
    let read_xml = situation.read_composition_xml(&parsed).unwrap();
    assert_eq!(read_xml, composition, "xml, seed {seed}");

    let rebuilt = situation.build(&read).unwrap().unwrap();
    let again = situation.convert(rebuilt.as_ref()).unwrap().unwrap();
    assert_eq!(again, composition, "rebuild, seed {seed}");
}

#[test]
fn seed_corpus() {
    for seed in [0, 1, 2, 7, 42, 1337, 0xDEAD_BEEF, u64::MAX] {
        check_tree(seed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_trees_round_trip(seed in any::<u64>()) {
        check_tree(seed);
    }
}
