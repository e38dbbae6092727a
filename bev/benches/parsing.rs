//! Benchmarks pour le parsing des extraits BEV

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::path::PathBuf;

use bev::tables::{AdresseReader, ADRESSE_CSV};

/// Génère un ADRESSE.csv synthétique de `rows` lignes
fn write_fixture(rows: usize) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bev_bench_{}", rows));
    std::fs::create_dir_all(&dir).unwrap();

    let mut content = String::with_capacity(rows * 120);
    content.push_str(
        "\"ADRCD\";\"GKZ\";\"OKZ\";\"SKZ\";\"PLZ\";\"HAUSNRTEXT\";\"HAUSNRZAHL1\";\"HAUSNRBUCHSTABE1\";\"HAUSNRVERBINDUNG1\";\"HAUSNRZAHL2\";\"HAUSNRBUCHSTABE2\";\"HAUSNRBEREICH\";\"HOFNAME\";\"RW\";\"HW\";\"EPSG\"\n",
    );
    for i in 0..rows {
        content.push_str(&format!(
            "\"{}\";\"10101\";\"17224\";\"1001\";\"7000\";\"\";\"{}\";\"\";\"\";\"\";\"\";\"keine Angabe\";\"\";\"{}.0\";\"{}.5\";\"31256\"\n",
            1000000 + i,
            i % 200 + 1,
            1800 + i % 100,
            262300 + i % 100,
        ));
    }
    std::fs::write(dir.join(ADRESSE_CSV), &content).unwrap();
    dir
}

fn bench_parse_adresse(c: &mut Criterion) {
    let dir = write_fixture(10_000);
    let file_size = std::fs::metadata(dir.join(ADRESSE_CSV))
        .map(|m| m.len())
        .unwrap_or(0);

    let mut group = c.benchmark_group("parse_adresse");
    group.throughput(Throughput::Bytes(file_size));

    group.bench_function("10k_rows", |b| {
        b.iter(|| {
            let reader = AdresseReader::open(black_box(&dir)).unwrap();
            let count = reader.rows().count();
            black_box(count)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_adresse);
criterion_main!(benches);
