//! IDi 상관관계 및 매칭 엔진
//!
//! [`MsgAnalyzer`]는 한 번의 분석 실행 동안 추출된 전체 메시지 목록과
//! IDi -> 엔드포인트 테이블을 소유합니다.
//!
//! # 소유권 규칙
//! - 쓰기: [`MsgAnalyzer::record`]만 테이블과 메시지 목록을 변경합니다.
//!   파이프라인에서는 소비자 태스크 하나가 엔진을 독점 소유하므로 쓰기 주체는
//!   항상 하나입니다.
//! - 읽기: 매칭 연산은 `&self`만 요구합니다. 파이프라인이 끝나
//!   엔진 소유권이 호출자에게 넘어온 뒤에만 호출할 수 있습니다.
//!
//! # 매칭
//! 하나의 터널은 로그 종류마다 다르게 표기되므로 세 가지 형태로 찾습니다.
//! 1. IDi 문자열 그대로
//! 2. 엔드포인트의 로그 표기 (`172.100.100.1[500]`)
//! 3. IDi가 DN이면 인증서 DN 표기 (`C=US, CN=SeGW-2`)

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::net::SocketAddr;

use metrics::counter;
use regex::Regex;
use tracing::debug;

use sridm_core::metrics::ANALYZER_IDENTITIES_OBSERVED_TOTAL;
use sridm_core::types::LogMsg;

use crate::dn::ike_dn_to_cert_dn;
use crate::endpoint::format_sr_endpoint;
use crate::error::AnalyzerError;
use crate::scanner::ScannedMsg;

/// 매칭된 터널 하나의 본문 검색 형태
#[derive(Debug)]
struct TunnelNeedles {
    idi: String,
    endpoint: String,
    cert_dn: Option<String>,
}

impl TunnelNeedles {
    fn new(idi: &str, endpoint: &SocketAddr) -> Self {
        let cert_dn = match ike_dn_to_cert_dn(idi) {
            Ok(dn) if !dn.is_empty() => Some(dn),
            Ok(_) => None,
            Err(e) => {
                debug!(idi, error = %e, "IDi has no certificate DN form");
                None
            }
        };

        Self {
            idi: idi.to_owned(),
            endpoint: format_sr_endpoint(endpoint),
            cert_dn,
        }
    }

    fn found_in(&self, body: &str) -> bool {
        body.contains(&self.idi)
            || body.contains(&self.endpoint)
            || self
                .cert_dn
                .as_deref()
                .is_some_and(|dn| body.contains(dn))
    }
}

/// 상관관계 및 매칭 엔진
#[derive(Debug, Default)]
pub struct MsgAnalyzer {
    /// 도착 순서대로의 메시지 목록
    msgs: Vec<LogMsg>,
    /// IDi -> 엔드포인트 (마지막 관측 우선)
    idi_eps: HashMap<String, SocketAddr>,
}

impl MsgAnalyzer {
    /// 빈 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 닫힌 메시지 하나를 기록합니다.
    ///
    /// 메시지에서 관측한 IDi는 본문 순서대로 테이블에 반영되며,
    /// 이미 있는 IDi는 덮어씁니다.
    pub fn record(&mut self, scanned: ScannedMsg) {
        for sighting in scanned.sightings {
            counter!(ANALYZER_IDENTITIES_OBSERVED_TOTAL).increment(1);
            let previous = self.idi_eps.insert(sighting.idi.clone(), sighting.endpoint);
            if let Some(previous) = previous.filter(|p| *p != sighting.endpoint) {
                debug!(
                    idi = %sighting.idi,
                    previous = %previous,
                    current = %sighting.endpoint,
                    "IDi endpoint overwritten"
                );
            }
        }
        self.msgs.push(scanned.msg);
    }

    /// 패턴에 매칭되는 IDi 집합을 반환합니다.
    ///
    /// IDi 안에서 비어 있지 않은 매칭이 하나라도 있으면 포함됩니다.
    ///
    /// # Errors
    /// 패턴이 유효한 정규식이 아니면 [`AnalyzerError::InvalidPattern`]
    pub fn matched_identities(&self, pattern: &str) -> Result<BTreeSet<String>, AnalyzerError> {
        let re = Regex::new(pattern)?;
        Ok(self
            .idi_eps
            .keys()
            .filter(|idi| re.find_iter(idi).any(|m| !m.is_empty()))
            .cloned()
            .collect())
    }

    /// 매칭된 IDi와 그 엔드포인트를 IDi 순서로 반환합니다.
    pub fn matched_endpoints(
        &self,
        pattern: &str,
    ) -> Result<BTreeMap<String, SocketAddr>, AnalyzerError> {
        let idis = self.matched_identities(pattern)?;
        Ok(idis
            .into_iter()
            .filter_map(|idi| self.idi_eps.get(&idi).map(|ep| (idi, *ep)))
            .collect())
    }

    /// 매칭된 터널에 속하는 메시지를 도착 순서대로 반환합니다.
    ///
    /// 직접 매칭된 메시지 뒤에 `continuation_of_previous`가 설정된
    /// 메시지가 이어지면 체인이 끊길 때까지 함께 포함합니다.
    ///
    /// # Errors
    /// 패턴이 유효한 정규식이 아니면 [`AnalyzerError::InvalidPattern`]
    pub fn matched_messages(&self, pattern: &str) -> Result<Vec<&LogMsg>, AnalyzerError> {
        let needles: Vec<TunnelNeedles> = self
            .matched_endpoints(pattern)?
            .iter()
            .map(|(idi, ep)| TunnelNeedles::new(idi, ep))
            .collect();

        let mut selected = Vec::new();
        let mut chained = false;

        for msg in &self.msgs {
            if needles.iter().any(|n| n.found_in(&msg.body)) {
                selected.push(msg);
                chained = true;
            } else if chained && msg.continuation_of_previous {
                selected.push(msg);
            } else {
                chained = false;
            }
        }

        Ok(selected)
    }

    /// "N matched out of total M" 요약 문자열을 반환합니다.
    ///
    /// ```text
    /// 1 matched out of total 3
    /// IDi 'client1' ==>  10.0.0.1:500
    /// ```
    pub fn eps_summary(&self, pattern: &str) -> Result<String, AnalyzerError> {
        let matched = self.matched_endpoints(pattern)?;

        let mut out = format!(
            "{} matched out of total {}\n",
            matched.len(),
            self.idi_eps.len()
        );
        for (idi, ep) in &matched {
            // String에 대한 write!는 실패하지 않음
            let _ = writeln!(out, "IDi '{idi}' ==>  {ep}");
        }
        Ok(out)
    }

    /// 전체 메시지 목록
    pub fn messages(&self) -> &[LogMsg] {
        &self.msgs
    }

    /// 메시지 수
    pub fn message_count(&self) -> usize {
        self.msgs.len()
    }

    /// 관측된 IDi 수
    pub fn identity_count(&self) -> usize {
        self.idi_eps.len()
    }

    /// IDi의 엔드포인트를 조회합니다.
    pub fn endpoint_of(&self, idi: &str) -> Option<SocketAddr> {
        self.idi_eps.get(idi).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::IdiSighting;
    use chrono::NaiveDate;

    fn msg(id: u64, body: &str, cont: bool) -> ScannedMsg {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 14)
            .unwrap()
            .and_hms_milli_opt(9, 0, 0, id as u32 % 1000)
            .unwrap();
        let mut m = LogMsg::new(id, ts, format!("{id} 2024/05/14 09:00:00.000 DEBUG #2001"));
        m.push_line(body);
        m.continuation_of_previous = cont;
        ScannedMsg {
            msg: m,
            sightings: Vec::new(),
        }
    }

    fn sighting(idi: &str, ep: &str) -> IdiSighting {
        IdiSighting {
            idi: idi.to_owned(),
            endpoint: ep.parse().unwrap(),
        }
    }

    fn engine_with(idis: &[(&str, &str)]) -> MsgAnalyzer {
        let mut engine = MsgAnalyzer::new();
        let mut carrier = msg(0, "IKE_AUTH", false);
        carrier.sightings = idis.iter().map(|(i, e)| sighting(i, e)).collect();
        engine.record(carrier);
        engine
    }

    fn ids(msgs: &[&LogMsg]) -> Vec<u64> {
        msgs.iter().map(|m| m.id).collect()
    }

    #[test]
    fn matched_identities_by_substring() {
        let engine = engine_with(&[
            ("client1", "10.0.0.1:500"),
            ("client2", "10.0.0.2:500"),
            ("server", "10.0.0.3:500"),
        ]);
        let set = engine.matched_identities("client").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("client1"));
        assert!(set.contains("client2"));
    }

    #[test]
    fn empty_matches_do_not_count() {
        let engine = engine_with(&[("client1", "10.0.0.1:500")]);
        assert!(engine.matched_identities("x*").unwrap().is_empty());
        assert_eq!(engine.matched_identities("").unwrap().len(), 0);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let engine = engine_with(&[("client1", "10.0.0.1:500")]);
        let err = engine.matched_identities("(").unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidPattern(_)));
        assert!(engine.matched_messages("[").is_err());
        assert!(engine.eps_summary("[").is_err());
    }

    #[test]
    fn last_write_wins() {
        let mut engine = MsgAnalyzer::new();
        let mut first = msg(1, "a", false);
        first.sightings = vec![sighting("client1", "10.0.0.1:500")];
        let mut second = msg(2, "b", false);
        second.sightings = vec![sighting("client1", "10.0.0.9:4500")];
        engine.record(first);
        engine.record(second);
        assert_eq!(engine.identity_count(), 1);
        assert_eq!(
            engine.endpoint_of("client1"),
            Some("10.0.0.9:4500".parse().unwrap())
        );
    }

    #[test]
    fn direct_match_by_identity_endpoint_and_dn() {
        let mut engine = engine_with(&[
            ("client1", "10.0.0.1:500"),
            ("CommonName=SeGW-2, Country=US", "10.0.0.2:500"),
        ]);
        engine.record(msg(1, "peer client1 authenticated", false));
        engine.record(msg(2, "Source: 10.0.0.1[500]", false));
        engine.record(msg(3, "subject: CN=SeGW-2, C=US", false));
        engine.record(msg(4, "unrelated", false));

        let matched = engine.matched_messages(".").unwrap();
        assert_eq!(ids(&matched), vec![1, 2, 3]);
    }

    #[test]
    fn ipv6_endpoint_uses_log_notation() {
        let mut engine = engine_with(&[("v6peer", "[2001:beef::100]:500")]);
        engine.record(msg(1, "Source: 2001:beef::100[500]", false));
        assert_eq!(ids(&engine.matched_messages("v6").unwrap()), vec![1]);
    }

    #[test]
    fn continuation_chain_of_k_messages() {
        let mut engine = engine_with(&[("client1", "10.0.0.1:500")]);
        engine.record(msg(1, "client1", false));
        engine.record(msg(2, "cert part", true));
        engine.record(msg(3, "cert part", true));
        engine.record(msg(4, "cert part", true));
        engine.record(msg(5, "other tunnel", false));
        engine.record(msg(6, "dangling part", true));

        let matched = engine.matched_messages("client1").unwrap();
        assert_eq!(ids(&matched), vec![1, 2, 3, 4]);
    }

    #[test]
    fn continuation_without_anchor_is_excluded() {
        let mut engine = engine_with(&[("client1", "10.0.0.1:500")]);
        engine.record(msg(1, "nothing", false));
        engine.record(msg(2, "part", true));
        assert!(engine.matched_messages("client1").unwrap().is_empty());
    }

    #[test]
    fn direct_match_inside_chain_keeps_chain_going() {
        let mut engine = engine_with(&[("client1", "10.0.0.1:500")]);
        engine.record(msg(1, "client1", false));
        engine.record(msg(2, "client1 again", true));
        engine.record(msg(3, "part", true));
        assert_eq!(ids(&engine.matched_messages("client1").unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn summary_reports_zero_matches() {
        let engine = engine_with(&[("client1", "10.0.0.1:500")]);
        assert_eq!(
            engine.eps_summary("nomatch").unwrap(),
            "0 matched out of total 1\n"
        );
    }

    #[test]
    fn summary_lists_sorted_identities() {
        let engine = engine_with(&[
            ("zeta", "10.0.0.2:500"),
            ("alpha", "[2001:beef::100]:4500"),
        ]);
        assert_eq!(
            engine.eps_summary(".").unwrap(),
            "2 matched out of total 2\n\
             IDi 'alpha' ==>  [2001:beef::100]:4500\n\
             IDi 'zeta' ==>  10.0.0.2:500\n"
        );
    }

    #[test]
    fn empty_engine() {
        let engine = MsgAnalyzer::new();
        assert_eq!(engine.message_count(), 0);
        assert!(engine.matched_messages(".").unwrap().is_empty());
        assert_eq!(engine.eps_summary(".").unwrap(), "0 matched out of total 0\n");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn widening_pattern_is_monotonic(
                names in prop::collection::btree_set("[a-z]{1,6}", 1..8),
                bodies in prop::collection::vec(("[a-z ]{0,12}", any::<bool>()), 0..20),
                probe in "[a-z]{1,3}",
            ) {
                let mut engine = MsgAnalyzer::new();
                let mut carrier = msg(0, "", false);
                carrier.sightings = names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| sighting(n, &format!("10.0.0.{}:500", i + 1)))
                    .collect();
                engine.record(carrier);
                for (i, (body, cont)) in bodies.iter().enumerate() {
                    engine.record(msg(i as u64 + 1, body, *cont));
                }

                let narrow_ids = engine.matched_identities(&probe).unwrap();
                let wide_ids = engine.matched_identities(".").unwrap();
                prop_assert!(narrow_ids.is_subset(&wide_ids));

                let narrow_msgs = engine.matched_messages(&probe).unwrap().len();
                let wide_msgs = engine.matched_messages(".").unwrap().len();
                prop_assert!(narrow_msgs <= wide_msgs);
            }
        }
    }
}
