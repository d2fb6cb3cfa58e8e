//! Integration tests for alc-core.
//!
//! Build chains through a [`Session`] backed by a catalog parsed from the
//! catalog API format, then check context, ports, latency and persistence.

use alc_core::{
    BranchRef, Catalog, Chain, ChainNode, DeviceDescriptor, DeviceNode, LibraryQuery, NodeId,
    Session, SortOrder, all_path_totals, total_latency,
};

const CATALOG: &str = r#"[
    {"id": 1, "name": "Stagebox 32", "brand": "Yamaha", "latency": 0.3, "display_time": "0,3ms",
     "source": "yamaha-rio", "raw_data": {"input_type": "Analog", "output_type": "Dante",
     "input_sr": "-", "output_sr": "48kHz"}},
    {"id": 2, "name": "Stagebox 32", "brand": "Yamaha", "latency": 0.35, "display_time": "0,35ms",
     "source": "yamaha-rio", "raw_data": {"input_type": "Analog", "output_type": "Dante",
     "input_sr": "-", "output_sr": "96kHz"}},
    {"id": 3, "name": "FOH Console", "brand": "DiGiCo", "latency": 1.2, "display_time": "1,2ms",
     "raw_data": {"input_type": "Dante", "output_type": "MADI",
     "input_sr": "48kHz", "output_sr": "48kHz"}},
    {"id": 4, "name": "Monitor Console", "brand": "DiGiCo", "latency": 1.0, "display_time": "1,0ms",
     "raw_data": {"input_type": "Dante", "output_type": "AES3",
     "input_sr": "96kHz", "output_sr": "96kHz"}},
    {"id": 5, "name": "Processor", "brand": "Lake", "display_time": "2,27ms (round trip)",
     "raw_data": {"input_type": "MADI", "output_type": "Analog",
     "input_sr": "48kHz", "output_sr": "-"}},
    {"id": 6, "name": "Amplifier", "latency": 3.84, "display_time": "3,84ms",
     "raw_data": {"input_type": "Analog", "output_type": "-", "input_sr": "-", "output_sr": "-"}}
]"#;

fn catalog() -> Catalog {
    Catalog::from_json(CATALOG).unwrap()
}

fn device(session: &Session, id: u64) -> DeviceDescriptor {
    session.catalog().get(id).cloned().unwrap()
}

#[test]
fn linear_chain_totals() {
    let chain = Chain::from_nodes(
        [3.5, 10.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, latency)| {
                let id = i as u64 + 1;
                let device = DeviceDescriptor::new(id, "d", *latency);
                ChainNode::from(DeviceNode::new(NodeId(id), device))
            })
            .collect(),
    );
    assert!((total_latency(&chain) - 13.5).abs() < 1e-9);
    let paths = all_path_totals(&chain);
    assert_eq!(paths.len(), 1);
    assert!(paths[0].label.is_empty());
}

#[test]
fn catalog_latency_falls_back_to_display_text() {
    let catalog = catalog();
    assert_eq!(catalog.get(5).unwrap().latency, 2.27);
    assert_eq!(catalog.get(6).unwrap().brand, "Unknown");
    assert_eq!(catalog.brands(), vec!["DiGiCo", "Lake", "Yamaha"]);
}

#[test]
fn split_front_of_house_and_monitors() {
    let mut session = Session::new(catalog());
    let stagebox = device(&session, 1);
    let foh = device(&session, 3);
    let monitors = device(&session, 4);
    let processor = device(&session, 5);
    let amp = device(&session, 6);

    let first = session.append_device(&stagebox, None).unwrap().unwrap();
    let split = session.split_at(first).unwrap();
    assert_eq!(session.focus(), Some(BranchRef::new(split, 0)));

    let ports: Vec<String> = session.ports_for_split(split).iter().map(|p| p.key()).collect();
    assert_eq!(ports, vec!["Dante|48kHz", "Dante|96kHz"]);

    // Branch A runs at 48 kHz: FOH console, processor, amp.
    session.append_device(&foh, None).unwrap().unwrap();
    session.append_device(&processor, None).unwrap().unwrap();
    session.append_device(&amp, None).unwrap().unwrap();

    // Branch B still carries the 48 kHz port; the 96 kHz console is refused.
    let branch_b = Some(BranchRef::new(split, 1));
    let err = session.append_device(&monitors, branch_b).unwrap_err();
    assert_eq!(err.reason, "SR 48kHz -> 96kHz");

    assert!(session.select_port(split, 1, "Dante|96kHz"));
    session.append_device(&monitors, branch_b).unwrap().unwrap();
    assert!(session.rename_branch(split, 0, "FOH"));
    assert!(session.rename_branch(split, 1, "Monitors"));

    let paths = session.all_path_totals();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].label, "FOH");
    assert!((paths[0].latency - (0.3 + 1.2 + 2.27 + 3.84)).abs() < 1e-9);
    assert_eq!(paths[1].label, "Monitors");
    assert!((paths[1].latency - 1.3).abs() < 1e-9);
    assert!((session.total_latency() - paths[0].latency).abs() < 1e-9);
}

#[test]
fn nested_split_round_trips_through_json() {
    let mut session = Session::new(catalog());
    let stagebox = device(&session, 1);
    let foh = device(&session, 3);
    let processor = device(&session, 5);

    let first = session.append_device(&stagebox, None).unwrap().unwrap();
    let outer = session.split_at(first).unwrap();
    session.select_port(outer, 1, "Dante|96kHz");
    let console = session.append_device(&foh, None).unwrap().unwrap();
    let inner = session.split_at(console).unwrap();
    session.rename_branch(inner, 1, "Broadcast");
    session.append_device(&processor, None).unwrap().unwrap();
    session.rename_node(console, "Desk");

    let json = serde_json::to_string_pretty(session.chain()).unwrap();
    let restored: Chain = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, session.chain());

    let inner_split = restored.find_split(inner).unwrap();
    assert_eq!(inner_split.branch_name(1), "Broadcast");
    let outer_split = restored.find_split(outer).unwrap();
    assert_eq!(outer_split.selected_ports[&1].key(), "Dante|96kHz");
    let desk = restored.find(console).and_then(ChainNode::as_device).unwrap();
    assert_eq!(desk.nickname.as_deref(), Some("Desk"));
}

#[test]
fn restored_session_continues_ids() {
    let mut session = Session::new(catalog());
    let stagebox = device(&session, 1);
    let a = session.append_device(&stagebox, None).unwrap().unwrap();
    let split = session.split_at(a).unwrap();
    let json = serde_json::to_string(session.chain()).unwrap();

    let chain: Chain = serde_json::from_str(&json).unwrap();
    let mut restored = Session::with_chain(catalog(), chain);
    let b = restored.append_device(&stagebox, Some(BranchRef::new(split, 0)));
    assert!(b.is_err(), "analog input after a dante port");
    let recorder = device(&restored, 3);
    let c = restored
        .append_device(&recorder, Some(BranchRef::new(split, 0)))
        .unwrap()
        .unwrap();
    assert!(c > split);
}

#[test]
fn removing_inside_branches() {
    let mut session = Session::new(catalog());
    let stagebox = device(&session, 1);
    let foh = device(&session, 3);
    let first = session.append_device(&stagebox, None).unwrap().unwrap();
    let split = session.split_at(first).unwrap();
    let console = session.append_device(&foh, None).unwrap().unwrap();

    assert!(session.remove_node(console));
    assert!(!session.remove_node(console));
    let node = session.chain().find_split(split).unwrap();
    assert_eq!(node.branches.len(), 2);
    assert!(node.branches[0].is_empty());
    assert_eq!(session.focus(), Some(BranchRef::new(split, 0)));
}

#[test]
fn library_for_branch_context() {
    let mut session = Session::new(catalog());
    let stagebox = device(&session, 1);
    let first = session.append_device(&stagebox, None).unwrap().unwrap();
    let split = session.split_at(first).unwrap();
    session.select_port(split, 0, "Dante|96kHz");

    let query = LibraryQuery {
        search: "console".to_string(),
        sort: SortOrder::NameAsc,
        ..LibraryQuery::default()
    };
    let entries = session.library(&query);
    let names: Vec<&str> = entries.iter().map(|e| e.device.name.as_str()).collect();
    assert_eq!(names, vec!["Monitor Console", "FOH Console"]);
    assert!(entries[0].is_compatible());
    assert_eq!(
        entries[1].compatibility.as_ref().unwrap_err().reason,
        "SR 96kHz -> 48kHz"
    );
}
