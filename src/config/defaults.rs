pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-8B";
pub const DEFAULT_API_KEY: &str = "EMPTY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "당신은 한국 날씨 정보를 제공하는 AI 어시스턴트입니다.

사용자가 날씨 정보를 요청하면:
1. korea_weather MCP 서버의 도구들을 사용하여 날씨 정보를 조회합니다
2. 조회된 정보를 한국어로 친절하게 설명합니다
3. 필요한 경우 위도/경도 정보를 요청하거나 서울(37.5665, 126.9780) 등의 주요 도시 좌표를 사용합니다

사용 가능한 날씨 도구들:
- get_nowcast_observation: 현재 날씨 관측 정보 (기온, 강수량, 습도, 풍속)
- get_nowcast_forecast: 초단기 예보 (6시간 이내)
- get_short_term_forecast: 단기 예보 (3일 이내)

항상 한국어로 응답하고, 날씨 정보를 명확하고 이해하기 쉽게 설명해주세요.

만약 날씨와 관계 없는 질문이라면 도구 사용 없이 일반적인 대화로 응답해주세요.";

pub fn default_top_p() -> f32 {
    0.8
}

pub fn default_temperature() -> f32 {
    0.7
}

pub fn default_max_tokens() -> u32 {
    2048
}

pub fn default_stream_timeout() -> u64 {
    60
}

pub fn default_tool_timeout() -> u64 {
    30
}

pub fn default_max_llm_calls() -> usize {
    20
}
