//! Slash commands understood by every channel.

pub const WELCOME_TEXT: &str = "\
🤖 Welcome to the AAS Agent!

I'm an AI assistant that helps you manage Asset Administration Shells using natural language.

You can ask me to:
• Create an AAS for a motor
• Add a submodel for technical data
• Add properties like temperature, serial number
• Update values
• Save and load AAS files
• Show the structure as a tree

Just tell me what you want to do in plain English!

Examples:
- \"Create an AAS for an electric motor\"
- \"Add a temperature property with value 25.5\"
- \"Show me the current structure\"
- \"Save this as motor.json\"

Try: /help for more information";

pub const HELP_TEXT: &str = "\
📖 AAS Agent - Help

What I can do:

🔧 Create & Manage
- Create new AAS
- Add submodels
- Add properties (String, Integer, Float, Boolean)
- Add concept descriptions and semantic IDs

📝 Data Operations
- Set property values
- Update existing values
- Get current values

💾 File Operations
- Save AAS to JSON file
- Load AAS from JSON file
- Export the complete digital twin as JSON

📊 View & Query
- Show tree view of structure
- Get current state summary
- Query specific properties

Example requests:

\"Create an AAS for a temperature sensor with ID sensor-001\"
\"Add a submodel called SensorData\"
\"Add a float property Temperature with value 23.5\"
\"Update the Temperature to 25.0\"
\"Show me the tree view\"
\"Save this as sensor.json\"
\"Load motor.json\"

Tips:
- Be natural! Just describe what you want
- I'll figure out the technical details
- You can refer to things by name (like \"update temperature\")

Type /state to see the current AAS state
Type /tree to see the tree view
Type /reset to start over";

pub const RESET_TEXT: &str = "✅ Reset complete! Starting fresh with no AAS.";
pub const UNKNOWN_TEXT: &str = "Unknown command. Try /help.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Help,
    State,
    Tree,
    Reset,
    Unknown(String),
}

impl ChatCommand {
    /// Parse a `/command`. Returns `None` for ordinary text.
    ///
    /// A `@botname` suffix and anything after the first word are ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let word = input.trim_start().strip_prefix('/')?.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or(word);
        Some(match name.to_ascii_lowercase().as_str() {
            "start" => ChatCommand::Start,
            "help" => ChatCommand::Help,
            "state" => ChatCommand::State,
            "tree" => ChatCommand::Tree,
            "reset" => ChatCommand::Reset,
            _ => ChatCommand::Unknown(name.to_string()),
        })
    }
}
