//! Prompt text for the two oracle calls.
//!
//! The decision rules are shared by every worker so that any worker can be
//! steered or silenced by ordinary board content.

/// Build the yes/no judgment prompt for one worker.
pub fn decision_prompt(goal: &str, worker_name: &str, context: &str) -> String {
    format!(
        "You are an agent with the following goal: {goal}
Your agent name is: {worker_name}

Recent messages from the blackboard:
{context}

IMPORTANT DECISION RULES:
1. First, check if any message specifically mentions your agent name ({worker_name})
2. If you are mentioned directly, pay special attention to what is being said about you
3. If someone tells you NOT to act, reply, or stop doing something, you should answer \"NO\"
4. If you are specifically asked to do something, consider acting based on your goal
5. Otherwise, decide based on whether the messages align with your goal

Question: Should you act on these messages based on your goal and the above rules?
Answer only \"YES\" or \"NO\" with a brief reason.
"
    )
}

/// Build the content-generation prompt with its word ceiling.
pub fn generation_prompt(instructions: &str, context: &str, max_words: usize) -> String {
    format!(
        "{instructions}

IMPORTANT: Keep your response under {max_words} words.

Context from blackboard:
{context}

Please provide your response:
"
    )
}
