//! 메시지 추출 / 매칭 벤치마크
//!
//! 스캐너의 줄 처리량과 엔진의 패턴 매칭 비용을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sridm_analyzer::{MsgAnalyzer, MsgScanner, ike_dn_to_cert_dn, split_lines};

/// IDi 페이로드가 있는 IKE_AUTH 메시지와 인증서 연속 메시지 한 쌍
fn capture(pairs: usize) -> String {
    let mut out = String::new();
    for i in 0..pairs {
        let seq = i * 2 + 1;
        let host = i % 250 + 1;
        out.push_str(&format!(
            "{seq} 2024/05/14 09:12:01.123 UTC MINOR: DEBUG #2001 Base IPsec\n\
             \"IPsec(1): IKEv2 Packet Received\n\
             Source: 10.0.{}.{host}[500]\n\
             Destination: 172.100.100.254[500]\n\
             IKEv2 Identification - initiator payload\n   \
                Next Payload: AUTH\n   \
                Payload Length: 22\n   \
                ID Type: ID_FQDN\n   \
                ID Data: client-{i}\n\
             \"\n\
             \n\
             {} 2024/05/14 09:12:01.124 UTC MINOR: DEBUG #2001 Base IPsec\n\
             \"IPsec(1): Certificate dump\n   \
                Cert cont:\n   \
                30 82 03 1b 30 82 02 03 a0 03 02 01 02\n\
             \"\n\
             \n",
            i / 250,
            seq + 1,
        ));
    }
    out
}

fn scan(lines: &[String]) -> MsgAnalyzer {
    let mut scanner = MsgScanner::new();
    let mut engine = MsgAnalyzer::new();
    for line in lines {
        if let Ok(Some(scanned)) = scanner.feed_line(line) {
            engine.record(scanned);
        }
    }
    engine
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    for pairs in [100, 1000] {
        let lines = split_lines(&capture(pairs));
        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::new("feed_lines", pairs), &lines, |b, lines| {
            b.iter(|| scan(black_box(lines)))
        });
    }

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let engine = scan(&split_lines(&capture(1000)));

    let mut group = c.benchmark_group("matching");
    group.bench_function("single_identity", |b| {
        b.iter(|| engine.matched_messages(black_box("client-42$")).unwrap().len())
    });
    group.bench_function("all_identities", |b| {
        b.iter(|| engine.matched_identities(black_box(".")).unwrap().len())
    });
    group.finish();
}

fn bench_dn(c: &mut Criterion) {
    let dn = "Country=US, StateOrProv=CA, Locality=Sunnyvale, OrgName=Nokia, \
              OrgUnitName=NI, CommonName=SeGW-2, Email=segw2@example.com";
    c.bench_function("ike_dn_to_cert_dn", |b| {
        b.iter(|| ike_dn_to_cert_dn(black_box(dn)).unwrap())
    });
}

criterion_group!(benches, bench_scanner, bench_matching, bench_dn);
criterion_main!(benches);
