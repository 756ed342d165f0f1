//! IDi -> 인증서 DN 변환
//!
//! IKEv2 패킷 디버그 출력의 IDi 표기
//! (`Country=US, StateOrProv=CA, OrgName=Nokia, CommonName=SeGW-2, Email=segw2@example.com`)
//! 를 인증서 디버그 출력의 subject 표기
//! (`C=US, ST=CA, O=Nokia, CN=SeGW-2/emailAddress=segw2@example.com`) 로 변환합니다.
//!
//! 같은 터널이 인증서 검증 로그에서는 DN 표기로만 나타나므로,
//! 매칭 엔진은 변환 결과를 세 번째 매칭 형태로 사용합니다.

use crate::error::AnalyzerError;

/// 이메일 속성의 인증서 표기 타입
const EMAIL_CERT_TYPE: &str = "emailAddress";

/// IKE 속성 이름 -> 인증서 속성 이름
fn cert_type(ike_type: &str) -> Option<&'static str> {
    match ike_type {
        "Country" => Some("C"),
        "StateOrProv" => Some("ST"),
        "Locality" => Some("L"),
        "OrgName" => Some("O"),
        "OrgUnitName" => Some("OU"),
        "CommonName" => Some("CN"),
        "Email" => Some(EMAIL_CERT_TYPE),
        _ => None,
    }
}

/// IKE 형식 DN을 인증서 형식 DN으로 변환합니다.
///
/// `Email`은 별도 쌍으로 출력하지 않고 `CN` 값 뒤에 `/emailAddress=...`로
/// 붙습니다. `CommonName`이 없으면 이메일은 버려집니다.
///
/// # Errors
/// - `=`가 전혀 없으면 [`AnalyzerError::NotDistinguishedName`]
/// - 알 수 없는 속성 타입이면 [`AnalyzerError::UnsupportedAttribute`] (부분 결과 없음)
/// - `=`가 없는 속성이 섞여 있으면 [`AnalyzerError::MalformedAttribute`]
pub fn ike_dn_to_cert_dn(ike_dn: &str) -> Result<String, AnalyzerError> {
    if !ike_dn.contains('=') {
        return Err(AnalyzerError::NotDistinguishedName(ike_dn.to_owned()));
    }

    let mut pairs: Vec<(&'static str, &str)> = Vec::new();
    let mut email = None;

    for field in ike_dn.split(',').filter(|f| !f.trim().is_empty()) {
        let (ike_type, value) = field
            .split_once('=')
            .ok_or_else(|| AnalyzerError::MalformedAttribute(field.trim().to_owned()))?;
        let ike_type = ike_type.trim();
        let value = value.trim();

        match cert_type(ike_type) {
            Some(EMAIL_CERT_TYPE) => email = Some(value),
            Some(cert) => pairs.push((cert, value)),
            None => return Err(AnalyzerError::UnsupportedAttribute(ike_type.to_owned())),
        }
    }

    let rendered: Vec<String> = pairs
        .into_iter()
        .map(|(key, value)| match (key, email) {
            ("CN", Some(mail)) if !mail.is_empty() => {
                format!("{key}={value}/{EMAIL_CERT_TYPE}={mail}")
            }
            _ => format!("{key}={value}"),
        })
        .collect();

    Ok(rendered.join(", "))
}
