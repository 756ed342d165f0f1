//! 줄 정규화
//!
//! 원시 텍스트를 논리적 줄 목록으로 나눕니다. 빈 줄은 메시지 종료
//! 구분자이므로 절대 합치거나 버리지 않습니다.

/// 입력을 줄 단위로 분리합니다.
///
/// - `\r\n`은 `\n`과 동일한 종료자로 취급합니다.
/// - 연속된 종료자 사이에는 빈 줄 항목이 생깁니다.
/// - 마지막 줄은 종료자가 없어도 포함되며, 입력 끝의 종료자는
///   추가 빈 줄을 만들지 않습니다.
pub fn split_lines(input: &str) -> Vec<String> {
    input.lines().map(str::to_owned).collect()
}
