//! Few-shot exemplar catalog.
//!
//! The model conditions on the surface form of these demonstrations, so the
//! text is kept byte-exact. The last planning instruction keeps its trailing
//! space.

/// System instruction sent ahead of every payload on the chat route.
pub const SYSTEM_INSTRUCTION: &str = "You are a precise code completion assistant. Complete the code with ONLY the necessary robot commands to fulfill the specific request. Do not generate extra commands. Do not explain. Stop after completing the request.";

/// Planning demonstrations: scene object list, instruction comment, and the
/// `robot.pick_and_place` calls that satisfy it, including corrections and
/// undo steps.
pub const PLANNING_EXEMPLARS: &str = r##"objects = ["scissors", "pear", "hammer", "mustard bottle", "tray"]
# put the bottle to the left side.
robot.pick_and_place("mustard bottle", "left side")
objects = ["banana", "foam brick", "strawberry", "tomato soup can", "pear", "tray"]
# move the fruit to the bottom right corner.
robot.pick_and_place("banana", "bottom right corner")
robot.pick_and_place("pear", "bottom right corner")
robot.pick_and_place("strawberry", "bottom right corner")
# now put the green one in the top side.
robot.pick_and_place("pear", "top side")
# undo the last step.
robot.pick_and_place("pear", "bottom right corner")
objects = ["potted meat can", "power drill", "chips can", "hammer", "tomato soup can", "tray"]
# put all cans in the tray.
robot.pick_and_place("potted meat can", "tray")
robot.pick_and_place("chips can", "tray")
robot.pick_and_place("tomato soup can", "tray")
objects = ["power drill", "strawberry", "medium clamp", "gelatin box", "tray"]
# move the clamp behind of the drill
robot.pick_and_place("medium clamp", "power drill", "behind")
# actually, I want it on the opposite side of the drill
robot.pick_and_place("medium clamp", "power drill", "front")
objects = ["chips can", "banana", "strawberry", "potted meat can", "pear", "tray"]
# put the red fruit left of the green one 
robot.pick_and_place("strawberry", "pear", "left")"##;

/// Grounding demonstrations: resolving a described object against the scene
/// with `find(objects, ...)` before acting on it.
pub const GROUNDING_EXEMPLARS: &str = r##"from robot_utils import pick_and_place
from camera_utils import find, scene_init

### start of trial
objects = scene_init()
# put the bottle to the left side.
bottle = find(objects, "bottle")[0]
pick_and_place(bottle, "left side")

### start of trial
objects = scene_init()
# move all the fruit to the bottom right corner.
fruits = find(objects, "fruit")
for fruit_instance in fruits:
    pick_and_place(fruit_instance, "bottom right corner")
# now put the small one in the right side.
small_fruit = find(fruits, "small fruit")[0]
pick_and_place(small_fruit, "right side")
# undo the last step.
pick_and_place(small_fruit, "bottom right corner")

### start of trial
objects = scene_init()
# put all cans in the tray.
cans = find(objects, "can")
for can_instance in cans:
    pick_and_place(can_instance, "tray")"##;

/// Which demonstration set conditions a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemplarSet {
    Planning,
    Grounding,
}

impl ExemplarSet {
    /// The exemplar text for this set.
    pub fn text(self) -> &'static str {
        match self {
            ExemplarSet::Planning => PLANNING_EXEMPLARS,
            ExemplarSet::Grounding => GROUNDING_EXEMPLARS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExemplarSet::Planning => "planning",
            ExemplarSet::Grounding => "grounding",
        }
    }
}
