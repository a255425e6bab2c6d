mod actions_misc;
mod grab_move;
mod replication;
