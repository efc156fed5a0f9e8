use stockpick_models::PickRequest;

/// System prompt for a pick agent. The response format matches what
/// `parser::parse_pick_response` accepts.
pub fn pick_system_prompt() -> String {
    "You are a highly aggressive day trader focused on short-term explosive stock moves.\n\n\
     Your job is to identify ONE stock that is likely to spike at least 10% TODAY based on a \
     very recent catalyst: something that happened in the last 24 hours, ideally within the \
     last few hours.\n\n\
     You may justify your pick using:\n\
     - Politician trading disclosures (recent House/Senate buys)\n\
     - Breaking news, earnings, PRs, FDA decisions, or regulatory events\n\
     - Reddit, Twitter, Discord, or Stocktwits hype\n\
     - Unusual intraday volume or price action\n\
     - Sector momentum from global events (wars, hacks, disasters, sanctions)\n\n\
     You may pick large-cap stocks only if the catalyst is strong enough to realistically \
     drive a 10%+ move today. Do NOT suggest safe or generic picks.\n\n\
     ## OUTPUT FORMAT\n\n\
     TICKER\n\
     One short sentence describing the catalyst behind your pick.\n\n\
     The ticker must be 1-5 uppercase letters and must be the very first thing in your \
     response. Nothing else. No disclaimers. No alternatives."
        .to_string()
}

/// User prompt for one attempt. Lists tickers that are already taken.
pub fn pick_user_prompt(request: &PickRequest) -> String {
    let mut prompt = String::from("Pick one stock ticker for today.");
    if !request.excluded.is_empty() {
        prompt.push_str(&format!(
            " These tickers are already taken, do not pick any of them: {}.",
            request.excluded.join(", ")
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(excluded: &[&str]) -> PickRequest {
        PickRequest {
            run_id: Uuid::nil(),
            worker_id: 1,
            attempt: 1,
            excluded: excluded.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn system_prompt_describes_format() {
        let prompt = pick_system_prompt();
        assert!(prompt.contains("TICKER"));
        assert!(prompt.contains("1-5 uppercase letters"));
    }

    #[test]
    fn user_prompt_without_exclusions() {
        assert_eq!(
            pick_user_prompt(&request(&[])),
            "Pick one stock ticker for today."
        );
    }

    #[test]
    fn user_prompt_lists_exclusions() {
        let prompt = pick_user_prompt(&request(&["AAPL", "NVDA"]));
        assert!(prompt.ends_with("do not pick any of them: AAPL, NVDA."));
    }
}
