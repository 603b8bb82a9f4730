use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};

use dovic_core::{ContactInfo, DeliveryRange, InvoiceNumber, TrackingCode};
use dovic_infra::{FreightStore, InMemoryStore};
use dovic_shipments::{Invoice, NewShipment, Shipment, ShipmentStatus};
use dovic_tracking::TrackingEvent;

fn contact(name: &str) -> ContactInfo {
    ContactInfo {
        name: name.to_string(),
        phone: "+2348012345678".to_string(),
        address: "12 Marina Rd".to_string(),
        email: None,
    }
}

fn spec() -> NewShipment {
    NewShipment {
        customer: None,
        quote: None,
        sender: contact("Ada Obi"),
        receiver: contact("John Hart"),
        origin: "Lagos".to_string(),
        destination: "London".to_string(),
        city: "Lagos".to_string(),
        country: "Nigeria".to_string(),
        weight_kg: 5.0,
        quantity: 1,
        delivery_range: DeliveryRange::Standard,
        price: 120.0,
        discount: 0.0,
        public_invoice: false,
    }
}

fn bench_invoice_compute(c: &mut Criterion) {
    c.bench_function("invoice_compute", |b| {
        let number = InvoiceNumber::generate(Utc::now());
        b.iter(|| {
            Invoice::compute(std::hint::black_box(number.clone()), 120.0, "Nigeria", 10.0)
                .unwrap()
        })
    });
}

fn bench_tracking_code_generate(c: &mut Criterion) {
    c.bench_function("tracking_code_generate", |b| {
        let now = Utc::now();
        b.iter(|| TrackingCode::generate(std::hint::black_box(now)))
    });
}

fn bench_ledger_append(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    c.bench_function("in_memory_ledger_append", |b| {
        let now = Utc::now();
        let store = InMemoryStore::new();
        let shipment = Shipment::book(
            spec(),
            TrackingCode::generate(now),
            InvoiceNumber::generate(now),
            now,
        )
        .unwrap();
        let first = TrackingEvent::record(
            shipment.id(),
            shipment.tracking_code().clone(),
            ShipmentStatus::Booked,
            "Lagos",
            "Nigeria",
            None,
            None,
            now,
        )
        .unwrap();
        runtime
            .block_on(store.create_shipment(&shipment, &first))
            .unwrap();

        b.iter(|| {
            let event = TrackingEvent::record(
                shipment.id(),
                shipment.tracking_code().clone(),
                ShipmentStatus::OnHold,
                "Accra",
                "Ghana",
                None,
                None,
                Utc::now(),
            )
            .unwrap();
            runtime.block_on(store.append_event(&event)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_invoice_compute,
    bench_tracking_code_generate,
    bench_ledger_append
);
criterion_main!(benches);
