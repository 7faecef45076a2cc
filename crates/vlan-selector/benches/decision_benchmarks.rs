use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use radius_proto::{Attribute, AttributeType, Code, Packet};
use serde_yaml::{Mapping, Value};
use vlan_selector::handler::decide;
use vlan_selector::{MacVlanMapping, normalize};

/// Mapping with `size` MACs spread over 16 VLANs
fn create_mapping(size: usize) -> MacVlanMapping {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from("default"), Value::from(999));
    for vlan in 0..16u64 {
        let macs: Vec<Value> = (0..size as u64)
            .filter(|i| i % 16 == vlan)
            .map(|i| Value::from(format!("{:012X}", i).as_str()))
            .collect();
        mapping.insert(Value::from(vlan + 1), Value::Sequence(macs));
    }
    MacVlanMapping::from_mapping(&mapping)
}

fn create_request(mac: &str) -> Packet {
    let mut packet = Packet::new(Code::AccessRequest, 1, [0u8; 16]);
    packet.add_attribute(
        Attribute::string(AttributeType::CallingStationId as u8, mac)
            .expect("Failed to create Calling-Station-Id attribute"),
    );
    packet
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("AA:BB:CC:DD:EE:FF")))
    });
}

fn bench_mapping_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping_build");

    for size in [100usize, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| create_mapping(size));
        });
    }

    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let mapping = create_mapping(10_000);
    let mapped = create_request("00-00-00-00-00-2A");
    let unmapped = create_request("FF-FF-FF-FF-FF-FF");

    c.bench_function("decide_mapped", |b| {
        b.iter(|| decide(black_box(&mapped), &mapping))
    });
    c.bench_function("decide_default", |b| {
        b.iter(|| decide(black_box(&unmapped), &mapping))
    });
}

criterion_group!(benches, bench_normalize, bench_mapping_build, bench_decide);
criterion_main!(benches);
